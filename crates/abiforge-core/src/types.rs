//! The ABI type system and the type normalizer.
//!
//! `AbiType::parse` is the canonical entry point for turning a Solidity type
//! token into a structured type: bare `int`/`uint` aliases are widened to
//! their 256-bit forms, array suffixes nest right-to-left (`uint[2][]` is a
//! dynamic array of 2-element arrays of `uint256`), and malformed widths are
//! rejected up front so no later stage ever sees a non-canonical type.

use crate::error::SignatureError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A Solidity ABI type.
///
/// `Custom` holds a struct reference by name; it only appears while a batch
/// of signatures is being resolved and is replaced by `Tuple` (with inlined
/// components) before any descriptor leaves the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Address,
    Bool,
    String,
    Bytes,
    /// `bytes1` .. `bytes32`. Width in bytes.
    FixedBytes(usize),
    /// `uint8` .. `uint256`. Width in bits, always a multiple of 8.
    Uint(usize),
    /// `int8` .. `int256`. Width in bits, always a multiple of 8.
    Int(usize),
    Tuple,
    /// Unresolved struct reference (by declared struct name).
    Custom(String),
    /// Array of `elem`; `len` is `None` for dynamic-length arrays.
    Array {
        elem: Box<AbiType>,
        len: Option<usize>,
    },
}

impl AbiType {
    /// Normalize an elementary type token, rejecting unknown names.
    pub fn parse(token: &str) -> Result<Self, SignatureError> {
        parse_inner(token.trim(), false)
    }

    /// Like [`AbiType::parse`], but an unknown identifier-shaped token
    /// becomes a `Custom` struct reference instead of an error.
    pub fn parse_loose(token: &str) -> Result<Self, SignatureError> {
        parse_inner(token.trim(), true)
    }

    /// The innermost element type, with every array wrapper stripped.
    pub fn base(&self) -> &AbiType {
        match self {
            AbiType::Array { elem, .. } => elem.base(),
            other => other,
        }
    }

    /// Whether this type is a tuple or an (arbitrarily nested) array of tuples.
    pub fn is_tuple_shaped(&self) -> bool {
        matches!(self.base(), AbiType::Tuple)
    }

    /// Replace the innermost element type, preserving array wrappers.
    pub fn with_base(&self, base: AbiType) -> AbiType {
        match self {
            AbiType::Array { elem, len } => AbiType::Array {
                elem: Box::new(elem.with_base(base)),
                len: *len,
            },
            _ => base,
        }
    }
}

fn parse_inner(token: &str, allow_custom: bool) -> Result<AbiType, SignatureError> {
    if let Some(stripped) = token.strip_suffix(']') {
        let open = stripped
            .rfind('[')
            .ok_or_else(|| SignatureError::UnbalancedParentheses {
                value: token.to_string(),
                side: crate::error::ParenSide::Closing,
            })?;
        let dim = &stripped[open + 1..];
        let len = if dim.is_empty() {
            None
        } else {
            Some(
                dim.parse::<usize>()
                    .map_err(|_| SignatureError::InvalidArrayDimension {
                        ty: token.to_string(),
                    })?,
            )
        };
        let elem = parse_inner(&stripped[..open], allow_custom)?;
        return Ok(AbiType::Array {
            elem: Box::new(elem),
            len,
        });
    }
    if token.contains('[') {
        return Err(SignatureError::InvalidArrayDimension {
            ty: token.to_string(),
        });
    }

    match token {
        "address" => return Ok(AbiType::Address),
        "bool" => return Ok(AbiType::Bool),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "tuple" => return Ok(AbiType::Tuple),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        _ => {}
    }

    if let Some(rest) = token.strip_prefix("uint") {
        if let Ok(width) = rest.parse::<usize>() {
            return check_int_width(token, width).map(|_| AbiType::Uint(width));
        }
    } else if let Some(rest) = token.strip_prefix("int") {
        if let Ok(width) = rest.parse::<usize>() {
            return check_int_width(token, width).map(|_| AbiType::Int(width));
        }
    } else if let Some(rest) = token.strip_prefix("bytes") {
        if let Ok(width) = rest.parse::<usize>() {
            if !(1..=32).contains(&width) {
                return Err(SignatureError::InvalidBytesWidth {
                    ty: token.to_string(),
                    width,
                });
            }
            return Ok(AbiType::FixedBytes(width));
        }
    }

    if allow_custom && is_identifier(token) {
        return Ok(AbiType::Custom(token.to_string()));
    }
    Err(SignatureError::UnknownType {
        ty: token.to_string(),
    })
}

fn check_int_width(token: &str, width: usize) -> Result<(), SignatureError> {
    if width % 8 != 0 || !(8..=256).contains(&width) {
        return Err(SignatureError::InvalidIntegerWidth {
            ty: token.to_string(),
            width,
        });
    }
    Ok(())
}

/// Whether `s` is a valid Solidity identifier.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => write!(f, "address"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::String => write!(f, "string"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Tuple => write!(f, "tuple"),
            AbiType::Custom(name) => write!(f, "{name}"),
            AbiType::Array { elem, len: Some(n) } => write!(f, "{elem}[{n}]"),
            AbiType::Array { elem, len: None } => write!(f, "{elem}[]"),
        }
    }
}

impl FromStr for AbiType {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbiType::parse(s)
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AbiType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AbiType::parse_loose(&s).map_err(de::Error::custom)
    }
}
