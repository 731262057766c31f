//! Structured ABI descriptors: parameters and items.
//!
//! `AbiItem` is a closed sum over the six Solidity item kinds; every consumer
//! matches exhaustively rather than sniffing a string tag. `overloads` is a
//! derived list attached at resolution time — it is never user-supplied and
//! never points back into a shared registry.

use crate::types::AbiType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One formal parameter of a function, event, error, constructor, or struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParameter {
    #[serde(rename = "type")]
    pub ty: AbiType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Present iff `ty` is tuple-shaped; length equals the tuple arity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParameter>,

    /// Only meaningful on event inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

impl AbiParameter {
    pub fn unnamed(ty: AbiType) -> Self {
        Self {
            ty,
            name: None,
            components: Vec::new(),
            indexed: None,
        }
    }

    pub fn named(ty: AbiType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: Some(name.into()),
            components: Vec::new(),
            indexed: None,
        }
    }

    pub fn tuple(components: Vec<AbiParameter>) -> Self {
        Self {
            ty: AbiType::Tuple,
            name: None,
            components,
            indexed: None,
        }
    }

    /// Whether this parameter's encoding has no fixed width known from the
    /// declaration alone (`string`, `bytes`, dynamic arrays, or any array or
    /// tuple containing a dynamic element).
    pub fn is_dynamic(&self) -> bool {
        type_is_dynamic(&self.ty, &self.components)
    }

    /// For array-typed parameters, a parameter describing one element.
    /// Components are shared: a `tuple[3]` element is a `tuple` with the
    /// same component list.
    pub fn element(&self) -> Option<AbiParameter> {
        match &self.ty {
            AbiType::Array { elem, .. } => Some(AbiParameter {
                ty: (**elem).clone(),
                name: self.name.clone(),
                components: self.components.clone(),
                indexed: None,
            }),
            _ => None,
        }
    }

    /// The canonical type text used for selector hashing: tuples are spelled
    /// out as `(t1,t2,...)`, names and whitespace are dropped.
    pub fn canonical_type(&self) -> String {
        canonical(&self.ty, &self.components)
    }
}

fn type_is_dynamic(ty: &AbiType, components: &[AbiParameter]) -> bool {
    match ty {
        AbiType::String | AbiType::Bytes => true,
        AbiType::Array { len: None, .. } => true,
        AbiType::Array {
            elem,
            len: Some(_),
        } => type_is_dynamic(elem, components),
        AbiType::Tuple => components.iter().any(AbiParameter::is_dynamic),
        _ => false,
    }
}

fn canonical(ty: &AbiType, components: &[AbiParameter]) -> String {
    match ty {
        AbiType::Array { elem, len } => {
            let suffix = match len {
                Some(n) => format!("[{n}]"),
                None => "[]".to_string(),
            };
            format!("{}{}", canonical(elem, components), suffix)
        }
        AbiType::Tuple => {
            let inner: Vec<String> = components.iter().map(AbiParameter::canonical_type).collect();
            format!("({})", inner.join(","))
        }
        other => other.to_string(),
    }
}

impl fmt::Display for AbiParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ty.is_tuple_shaped() {
            write!(f, "{}", tuple_display(&self.ty, &self.components))?;
        } else {
            write!(f, "{}", self.ty)?;
        }
        if self.indexed == Some(true) {
            write!(f, " indexed")?;
        }
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

fn tuple_display(ty: &AbiType, components: &[AbiParameter]) -> String {
    match ty {
        AbiType::Array { elem, len } => {
            let suffix = match len {
                Some(n) => format!("[{n}]"),
                None => "[]".to_string(),
            };
            format!("{}{}", tuple_display(elem, components), suffix)
        }
        _ => {
            let inner: Vec<String> = components.iter().map(|c| c.to_string()).collect();
            format!("({})", inner.join(", "))
        }
    }
}

/// Function/constructor state mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateMutability::Pure => write!(f, "pure"),
            StateMutability::View => write!(f, "view"),
            StateMutability::Nonpayable => write!(f, "nonpayable"),
            StateMutability::Payable => write!(f, "payable"),
        }
    }
}

/// One parsed ABI item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    Function {
        name: String,
        inputs: Vec<AbiParameter>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        outputs: Vec<AbiParameter>,
        #[serde(rename = "stateMutability", default)]
        state_mutability: StateMutability,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        overloads: Vec<AbiItem>,
    },
    Event {
        name: String,
        inputs: Vec<AbiParameter>,
        #[serde(default)]
        anonymous: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        overloads: Vec<AbiItem>,
    },
    Error {
        name: String,
        inputs: Vec<AbiParameter>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        overloads: Vec<AbiItem>,
    },
    Constructor {
        inputs: Vec<AbiParameter>,
        #[serde(rename = "stateMutability", default)]
        state_mutability: StateMutability,
    },
    Fallback {
        #[serde(rename = "stateMutability", default)]
        state_mutability: StateMutability,
    },
    Receive,
}

impl AbiItem {
    pub fn kind(&self) -> &'static str {
        match self {
            AbiItem::Function { .. } => "function",
            AbiItem::Event { .. } => "event",
            AbiItem::Error { .. } => "error",
            AbiItem::Constructor { .. } => "constructor",
            AbiItem::Fallback { .. } => "fallback",
            AbiItem::Receive => "receive",
        }
    }

    /// Declared name, absent for constructor/fallback/receive.
    pub fn name(&self) -> Option<&str> {
        match self {
            AbiItem::Function { name, .. }
            | AbiItem::Event { name, .. }
            | AbiItem::Error { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn inputs(&self) -> &[AbiParameter] {
        match self {
            AbiItem::Function { inputs, .. }
            | AbiItem::Event { inputs, .. }
            | AbiItem::Error { inputs, .. }
            | AbiItem::Constructor { inputs, .. } => inputs,
            _ => &[],
        }
    }

    pub fn inputs_mut(&mut self) -> Option<&mut Vec<AbiParameter>> {
        match self {
            AbiItem::Function { inputs, .. }
            | AbiItem::Event { inputs, .. }
            | AbiItem::Error { inputs, .. }
            | AbiItem::Constructor { inputs, .. } => Some(inputs),
            AbiItem::Fallback { .. } | AbiItem::Receive => None,
        }
    }

    pub fn outputs_mut(&mut self) -> Option<&mut Vec<AbiParameter>> {
        match self {
            AbiItem::Function { outputs, .. } => Some(outputs),
            _ => None,
        }
    }

    pub fn overloads(&self) -> &[AbiItem] {
        match self {
            AbiItem::Function { overloads, .. }
            | AbiItem::Event { overloads, .. }
            | AbiItem::Error { overloads, .. } => overloads,
            _ => &[],
        }
    }

    /// Attach the computed sibling set. No-op for item kinds that cannot
    /// be overloaded.
    pub fn with_overloads(mut self, siblings: Vec<AbiItem>) -> Self {
        match &mut self {
            AbiItem::Function { overloads, .. }
            | AbiItem::Event { overloads, .. }
            | AbiItem::Error { overloads, .. } => *overloads = siblings,
            _ => {}
        }
        self
    }
}

fn join_params(params: &[AbiParameter]) -> String {
    let parts: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    parts.join(", ")
}

impl fmt::Display for AbiItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiItem::Function {
                name,
                inputs,
                outputs,
                state_mutability,
                ..
            } => {
                write!(f, "function {name}({})", join_params(inputs))?;
                if *state_mutability != StateMutability::Nonpayable {
                    write!(f, " {state_mutability}")?;
                }
                if !outputs.is_empty() {
                    write!(f, " returns ({})", join_params(outputs))?;
                }
                Ok(())
            }
            AbiItem::Event {
                name,
                inputs,
                anonymous,
                ..
            } => {
                write!(f, "event {name}({})", join_params(inputs))?;
                if *anonymous {
                    write!(f, " anonymous")?;
                }
                Ok(())
            }
            AbiItem::Error { name, inputs, .. } => {
                write!(f, "error {name}({})", join_params(inputs))
            }
            AbiItem::Constructor {
                inputs,
                state_mutability,
            } => {
                write!(f, "constructor({})", join_params(inputs))?;
                if *state_mutability == StateMutability::Payable {
                    write!(f, " payable")?;
                }
                Ok(())
            }
            AbiItem::Fallback { state_mutability } => {
                write!(f, "fallback() external")?;
                if *state_mutability == StateMutability::Payable {
                    write!(f, " payable")?;
                }
                Ok(())
            }
            AbiItem::Receive => write!(f, "receive() external payable"),
        }
    }
}
