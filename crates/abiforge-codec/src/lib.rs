//! # abiforge-codec
//!
//! The binary side of AbiForge: encodes typed values into the canonical
//! contract-ABI wire format (32-byte words, head/tail addressing) and back,
//! and resolves which overload of a named item a call refers to.
//!
//! Every operation is a pure function of its inputs — no caches, no I/O,
//! no shared state. Scratch buffers are allocated per call.

pub mod decoder;
pub mod encoder;
pub mod overload;

pub use decoder::{decode, decode_call};
pub use encoder::{encode, encode_call};
pub use overload::{resolve_by_args, resolve_by_data};
