//! Struct extraction and recursive inlining.
//!
//! Works in two phases over a batch of signatures: a shallow pass collects
//! `struct Name { ... }` declarations with their properties still referencing
//! other structs by name, then a resolve pass replaces every struct reference
//! with an inlined `tuple` (preserving array suffixes) all the way down.
//! An explicit ancestor set rides along the recursion so reference cycles
//! fail fast instead of overflowing the stack.

use crate::parser::{self, ParamContext};
use abiforge_core::{
    error::SignatureError,
    param::{AbiItem, AbiParameter},
    types::AbiType,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::trace;

/// Struct name → ordered component list, in declaration order.
pub type StructLookup = IndexMap<String, Vec<AbiParameter>>;

/// Extract and fully resolve every struct declaration in `signatures`.
///
/// The returned lookup contains no `Custom` references; resolving an already
/// resolved lookup is a no-op.
pub fn resolve_structs<S: AsRef<str>>(signatures: &[S]) -> Result<StructLookup, SignatureError> {
    let shallow = extract_structs(signatures)?;
    let mut resolved = StructLookup::with_capacity(shallow.len());
    for (name, params) in &shallow {
        trace!(struct_name = %name, "resolving struct");
        let mut ancestors = HashSet::new();
        ancestors.insert(name.clone());
        let components = params
            .iter()
            .map(|p| resolve_param(p, &shallow, &ancestors))
            .collect::<Result<Vec<_>, _>>()?;
        resolved.insert(name.clone(), components);
    }
    Ok(resolved)
}

/// Parse a batch of signatures, resolving struct references across the batch.
/// Struct declarations contribute to the lookup but produce no item.
pub fn parse_abi<S: AsRef<str>>(signatures: &[S]) -> Result<Vec<AbiItem>, SignatureError> {
    let lookup = resolve_structs(signatures)?;
    let no_ancestors = HashSet::new();

    let mut items = Vec::new();
    for signature in signatures {
        let sig = signature.as_ref().trim();
        if sig.starts_with("struct ") {
            continue;
        }
        let mut item = parser::parse_item_loose(sig)?;
        if let Some(inputs) = item.inputs_mut() {
            for param in inputs.iter_mut() {
                *param = resolve_param(param, &lookup, &no_ancestors)?;
            }
        }
        if let Some(outputs) = item.outputs_mut() {
            for param in outputs.iter_mut() {
                *param = resolve_param(param, &lookup, &no_ancestors)?;
            }
        }
        items.push(item);
    }
    Ok(items)
}

/// Shallow phase: collect struct declarations without resolving references.
fn extract_structs<S: AsRef<str>>(signatures: &[S]) -> Result<StructLookup, SignatureError> {
    let mut shallow = StructLookup::new();
    for signature in signatures {
        let sig = signature.as_ref().trim();
        let Some(rest) = sig.strip_prefix("struct ") else {
            continue;
        };
        let invalid = || SignatureError::InvalidSignature {
            signature: sig.to_string(),
        };

        let open = rest.find('{').ok_or_else(invalid)?;
        let close = rest.rfind('}').ok_or_else(invalid)?;
        if close < open {
            return Err(invalid());
        }
        let name = rest[..open].trim();
        if !parser::is_identifier(name) {
            return Err(invalid());
        }
        let body = &rest[open + 1..close];

        let mut properties = Vec::new();
        for segment in body.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            properties.push(parser::parse_parameter_loose(segment, ParamContext::Struct)?);
        }
        if properties.is_empty() {
            return Err(SignatureError::EmptyStruct {
                name: name.to_string(),
            });
        }
        shallow.insert(name.to_string(), properties);
    }
    Ok(shallow)
}

/// Resolve phase: replace struct references with inlined tuples, threading
/// the set of names currently being resolved to detect cycles.
pub(crate) fn resolve_param(
    param: &AbiParameter,
    lookup: &StructLookup,
    ancestors: &HashSet<String>,
) -> Result<AbiParameter, SignatureError> {
    match param.ty.base() {
        AbiType::Custom(name) => {
            if ancestors.contains(name) {
                return Err(SignatureError::CircularReference { name: name.clone() });
            }
            let properties = lookup
                .get(name)
                .ok_or_else(|| SignatureError::UnknownType { ty: name.clone() })?;
            let mut next = ancestors.clone();
            next.insert(name.clone());
            let components = properties
                .iter()
                .map(|p| resolve_param(p, lookup, &next))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AbiParameter {
                ty: param.ty.with_base(AbiType::Tuple),
                name: param.name.clone(),
                components,
                indexed: param.indexed,
            })
        }
        AbiType::Tuple => {
            let components = param
                .components
                .iter()
                .map(|p| resolve_param(p, lookup, ancestors))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AbiParameter {
                components,
                ..param.clone()
            })
        }
        _ => Ok(param.clone()),
    }
}
