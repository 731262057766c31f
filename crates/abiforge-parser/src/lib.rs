//! # abiforge-parser
//!
//! Parses human-readable Solidity interface signatures
//! (`"function transfer(address to, uint256 amount)"`) into the structured
//! descriptors defined in `abiforge-core`, resolves `struct` declarations
//! into inlined tuple trees, and derives canonical selectors.
//!
//! ## Entry points
//! - [`parse_item`] — one whole-item signature, struct references rejected
//! - [`parse_parameters`] — a bare parameter list
//! - [`parse_abi`] — a batch of signatures with struct resolution
//! - [`selector`] / [`topic`] — selector derivation via an injected hash

pub mod parser;
pub mod selector;
pub mod structs;

pub use parser::{parse_item, parse_parameter, parse_parameters, ParamContext};
pub use selector::{canonical_signature, selector, topic};
pub use structs::{parse_abi, resolve_structs, StructLookup};
