//! # abiforge-core
//!
//! Core types and primitives shared across all AbiForge crates.
//! The signature parser, struct resolver, binary codec, and overload
//! resolver are all built on top of the type system defined here.

pub mod error;
pub mod hash;
pub mod param;
pub mod types;
pub mod value;

pub use error::{CodecError, ParenSide, ResolveError, SignatureError};
pub use hash::{is_address, Hasher, Keccak256};
pub use param::{AbiItem, AbiParameter, StateMutability};
pub use types::AbiType;
pub use value::AbiValue;
