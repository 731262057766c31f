//! Runtime ABI values.
//!
//! `AbiValue` is the loosely-shaped value the codec encodes and decodes.
//! JSON conversion lives here so the CLI (and any embedding application)
//! can move values across a serde boundary without the codec caring.

use crate::error::CodecError;
use crate::param::AbiParameter;
use crate::types::AbiType;
use alloy_primitives::{Address, I256, U256};
use std::fmt;
use std::str::FromStr;

/// A value paired with an [`AbiParameter`] at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    /// Value for a `bytesN` parameter; length is validated against N.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn uint(v: u64) -> Self {
        AbiValue::Uint(U256::from(v))
    }

    pub fn address(s: &str) -> Result<Self, CodecError> {
        Address::from_str(s)
            .map(AbiValue::Address)
            .map_err(|e| CodecError::InvalidData {
                reason: format!("invalid address '{s}': {e}"),
            })
    }

    /// Convert to a JSON value. Numbers that fit a `u64`/`i64` become JSON
    /// numbers; larger ones become decimal strings so precision is never lost.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            AbiValue::Bool(b) => Value::Bool(*b),
            AbiValue::Uint(u) => match u64::try_from(*u) {
                Ok(v) => Value::from(v),
                Err(_) => Value::String(u.to_string()),
            },
            AbiValue::Int(i) => match i64::try_from(*i) {
                Ok(v) => Value::from(v),
                Err(_) => Value::String(i.to_string()),
            },
            AbiValue::Address(a) => Value::String(a.to_checksum(None)),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                Value::String(format!("0x{}", hex::encode(b)))
            }
            AbiValue::String(s) => Value::String(s.clone()),
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                Value::Array(items.iter().map(AbiValue::to_json).collect())
            }
        }
    }

    /// Coerce a JSON value into the shape a parameter expects.
    pub fn from_json(param: &AbiParameter, json: &serde_json::Value) -> Result<Self, CodecError> {
        use serde_json::Value;
        let mismatch = || CodecError::TypeMismatch {
            expected: param.canonical_type(),
            got: json.to_string(),
        };
        match &param.ty {
            AbiType::Bool => json.as_bool().map(AbiValue::Bool).ok_or_else(mismatch),
            AbiType::Uint(_) => match json {
                Value::Number(n) => n
                    .as_u64()
                    .map(|v| AbiValue::Uint(U256::from(v)))
                    .ok_or_else(mismatch),
                Value::String(s) => U256::from_str(s).map(AbiValue::Uint).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            AbiType::Int(_) => match json {
                Value::Number(n) => {
                    let v = n.as_i64().ok_or_else(mismatch)?;
                    I256::try_from(i128::from(v))
                        .map(AbiValue::Int)
                        .map_err(|_| mismatch())
                }
                Value::String(s) => I256::from_str(s).map(AbiValue::Int).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            AbiType::Address => json
                .as_str()
                .and_then(|s| Address::from_str(s).ok())
                .map(AbiValue::Address)
                .ok_or_else(mismatch),
            AbiType::Bytes => hex_from_json(json)
                .map(AbiValue::Bytes)
                .ok_or_else(mismatch),
            AbiType::FixedBytes(_) => hex_from_json(json)
                .map(AbiValue::FixedBytes)
                .ok_or_else(mismatch),
            AbiType::String => json
                .as_str()
                .map(|s| AbiValue::String(s.to_string()))
                .ok_or_else(mismatch),
            AbiType::Array { .. } => {
                let elems = json.as_array().ok_or_else(mismatch)?;
                let elem_param = param.element().ok_or_else(mismatch)?;
                let values: Result<Vec<_>, _> = elems
                    .iter()
                    .map(|e| AbiValue::from_json(&elem_param, e))
                    .collect();
                Ok(AbiValue::Array(values?))
            }
            AbiType::Tuple => {
                let fields = json.as_array().ok_or_else(mismatch)?;
                if fields.len() != param.components.len() {
                    return Err(mismatch());
                }
                let values: Result<Vec<_>, _> = param
                    .components
                    .iter()
                    .zip(fields.iter())
                    .map(|(c, v)| AbiValue::from_json(c, v))
                    .collect();
                Ok(AbiValue::Tuple(values?))
            }
            AbiType::Custom(name) => Err(CodecError::InvalidData {
                reason: format!("unresolved struct reference '{name}'"),
            }),
        }
    }
}

fn hex_from_json(json: &serde_json::Value) -> Option<Vec<u8>> {
    let s = json.as_str()?;
    let s = s.strip_prefix("0x")?;
    hex::decode(s).ok()
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Uint(u) => write!(f, "{u}"),
            AbiValue::Int(i) => write!(f, "{i}"),
            AbiValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => write!(f, "{s}"),
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
