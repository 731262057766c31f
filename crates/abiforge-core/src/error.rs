//! Error types for the AbiForge parse/encode/resolve pipeline.

use thiserror::Error;

/// Which side of a parenthesis pair is in excess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenSide {
    Opening,
    Closing,
}

impl std::fmt::Display for ParenSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParenSide::Opening => write!(f, "opening"),
            ParenSide::Closing => write!(f, "closing"),
        }
    }
}

/// Errors from the signature grammar: tokenizing, type normalization,
/// and struct resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Unknown type: '{ty}'")]
    UnknownType { ty: String },

    #[error("Invalid integer width in '{ty}': {width} is not a multiple of 8 between 8 and 256")]
    InvalidIntegerWidth { ty: String, width: usize },

    #[error("Invalid bytes width in '{ty}': {width} is not between 1 and 32")]
    InvalidBytesWidth { ty: String, width: usize },

    #[error("Invalid array dimension in '{ty}'")]
    InvalidArrayDimension { ty: String },

    #[error("Invalid signature: '{signature}'")]
    InvalidSignature { signature: String },

    #[error("Invalid parameter: '{param}'")]
    InvalidParameter { param: String },

    #[error("Unbalanced parentheses in '{value}': too many {side} parentheses")]
    UnbalancedParentheses { value: String, side: ParenSide },

    #[error("Modifier '{modifier}' is not allowed in {context} parameters")]
    InvalidModifier { modifier: String, context: String },

    #[error("'{name}' is a reserved keyword and cannot be used as a parameter name")]
    ReservedKeyword { name: String },

    #[error("Struct '{name}' has no properties")]
    EmptyStruct { name: String },

    #[error("Circular reference: struct '{name}' is referenced while it is still being resolved")]
    CircularReference { name: String },
}

/// Errors from the binary parameter codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Parameter/value length mismatch: {expected} parameters, {given} values")]
    LengthMismatch { expected: usize, given: usize },

    #[error("Array length mismatch for '{ty}': expected {expected} elements, got {given}")]
    ArrayLengthMismatch {
        ty: String,
        expected: usize,
        given: usize,
    },

    #[error("Bytes size mismatch: bytes{expected} value must be exactly {expected} bytes, got {given}")]
    BytesSizeMismatch { expected: usize, given: usize },

    #[error("Data size of {size} bytes is too small to decode [{params}] from 0x{data}")]
    DataSizeTooSmall {
        params: String,
        size: usize,
        data: String,
    },

    #[error("Cannot decode zero data ('0x') against non-empty parameters [{params}]")]
    ZeroData { params: String },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid data: {reason}")]
    InvalidData { reason: String },
}

/// Errors from overload resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No matching item found for '{name}'")]
    NotFound { name: String },

    #[error("Ambiguous overloads: '{sig_a}' and '{sig_b}' both match ({ty_a} vs {ty_b})")]
    Ambiguity {
        sig_a: String,
        sig_b: String,
        ty_a: String,
        ty_b: String,
    },
}
