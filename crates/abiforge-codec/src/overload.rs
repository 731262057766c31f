//! Overload resolution: pick one item out of a set of siblings sharing a name.
//!
//! Two entry points, for the two things a caller can hold: raw call data
//! (resolution is purely by selector hash) or concrete argument values
//! (resolution is by structural compatibility, with a value-dependent
//! ambiguity check for type pairs that encode look-alike).

use abiforge_core::{
    error::ResolveError,
    hash::{is_address, Hasher},
    param::{AbiItem, AbiParameter},
    types::AbiType,
    value::AbiValue,
};
use tracing::debug;

/// Resolve among `candidates` by the selector or topic prefix of `data`.
///
/// Functions and errors are matched on the first 4 bytes, events on the
/// first 32. The winner is returned with every other candidate attached as
/// its `overloads`, so the caller keeps the full sibling set.
pub fn resolve_by_data(
    candidates: &[AbiItem],
    data: &[u8],
    hasher: &dyn Hasher,
) -> Result<AbiItem, ResolveError> {
    for (idx, candidate) in candidates.iter().enumerate() {
        let matched = match candidate {
            AbiItem::Event { .. } => abiforge_parser::topic(candidate, hasher)
                .is_some_and(|topic| data.len() >= 32 && data[..32] == topic),
            _ => abiforge_parser::selector(candidate, hasher)
                .is_some_and(|sel| data.len() >= 4 && data[..4] == sel),
        };
        if matched {
            debug!(item = %candidate, "resolved overload by selector");
            return Ok(winner(candidates, idx));
        }
    }
    Err(not_found(candidates, data))
}

/// Resolve among `candidates` by the shape of the supplied argument values.
///
/// A candidate matches when its arity equals the argument count and every
/// argument is shape-compatible with the declared parameter type. A
/// zero-parameter candidate with zero arguments therefore wins outright.
/// When several candidates match and two of them declare confusable types
/// at the same position, resolution fails with both signatures named.
pub fn resolve_by_args(
    candidates: &[AbiItem],
    args: &[AbiValue],
) -> Result<AbiItem, ResolveError> {
    let matches: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.inputs().len() == args.len()
                && c.inputs().iter().zip(args).all(|(p, v)| matches_shape(p, v))
        })
        .map(|(idx, _)| idx)
        .collect();

    let Some(&first) = matches.first() else {
        return Err(not_found(candidates, &[]));
    };

    for (i, &a_idx) in matches.iter().enumerate() {
        for &b_idx in &matches[i + 1..] {
            let a = &candidates[a_idx];
            let b = &candidates[b_idx];
            let positions = a.inputs().iter().zip(b.inputs()).zip(args);
            for ((pa, pb), value) in positions {
                if confusable(&pa.ty, &pb.ty, value) {
                    return Err(ResolveError::Ambiguity {
                        sig_a: a.to_string(),
                        sig_b: b.to_string(),
                        ty_a: pa.canonical_type(),
                        ty_b: pb.canonical_type(),
                    });
                }
            }
        }
    }

    debug!(item = %candidates[first], "resolved overload by arguments");
    Ok(winner(candidates, first))
}

/// Clone the winning item and attach its siblings as `overloads`.
fn winner(candidates: &[AbiItem], idx: usize) -> AbiItem {
    let siblings: Vec<AbiItem> = candidates
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != idx)
        .map(|(_, item)| item.clone())
        .collect();
    candidates[idx].clone().with_overloads(siblings)
}

fn not_found(candidates: &[AbiItem], data: &[u8]) -> ResolveError {
    let name = candidates
        .iter()
        .find_map(AbiItem::name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("0x{}", hex::encode(data)));
    ResolveError::NotFound { name }
}

/// Is `value` a plausible inhabitant of the declared type? This is a shape
/// check, not a range check: any integer value matches any integer width.
fn matches_shape(param: &AbiParameter, value: &AbiValue) -> bool {
    match (&param.ty, value) {
        (AbiType::Bool, AbiValue::Bool(_)) => true,
        (AbiType::Uint(_) | AbiType::Int(_), AbiValue::Uint(_) | AbiValue::Int(_)) => true,
        (AbiType::Address, AbiValue::Address(_)) => true,
        (AbiType::Address, AbiValue::String(s)) => is_address(s),
        (AbiType::Address, AbiValue::Bytes(b) | AbiValue::FixedBytes(b)) => b.len() == 20,
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(b) | AbiValue::Bytes(b)) => b.len() == *n,
        (AbiType::FixedBytes(n), AbiValue::Address(_)) => *n == 20,
        (AbiType::FixedBytes(n), AbiValue::String(s)) => hex_byte_len(s) == Some(*n),
        (AbiType::Bytes, AbiValue::Bytes(_) | AbiValue::FixedBytes(_)) => true,
        (AbiType::Bytes, AbiValue::String(s)) => hex_byte_len(s).is_some(),
        (AbiType::String, AbiValue::String(_)) => true,
        (AbiType::Array { len, .. }, AbiValue::Array(elems)) => {
            if len.is_some_and(|n| n != elems.len()) {
                return false;
            }
            match param.element() {
                Some(elem) => elems.iter().all(|v| matches_shape(&elem, v)),
                None => false,
            }
        }
        (AbiType::Tuple, AbiValue::Tuple(fields)) => {
            param.components.len() == fields.len()
                && param
                    .components
                    .iter()
                    .zip(fields)
                    .all(|(p, v)| matches_shape(p, v))
        }
        _ => false,
    }
}

/// Byte length of a `0x`-prefixed hex literal, or `None` if it is not one.
fn hex_byte_len(s: &str) -> Option<usize> {
    let digits = s.strip_prefix("0x")?;
    if digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(digits.len() / 2)
}

/// Can both declared types plausibly claim the same argument? Symmetric in
/// the pair. `address` and `bytes20` encode identically, so they are always
/// confusable; `address` against `string`/`bytes` only becomes confusable
/// when the actual argument is itself a well-formed address.
fn confusable(a: &AbiType, b: &AbiType, value: &AbiValue) -> bool {
    confusable_ordered(a, b, value) || confusable_ordered(b, a, value)
}

fn confusable_ordered(a: &AbiType, b: &AbiType, value: &AbiValue) -> bool {
    match (a, b) {
        (AbiType::Address, AbiType::FixedBytes(n)) => *n == 20,
        (AbiType::Address, AbiType::String | AbiType::Bytes) => {
            matches!(value, AbiValue::String(s) if is_address(s))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiforge_core::hash::Keccak256;
    use abiforge_parser::parse_item;

    const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    fn items(sigs: &[&str]) -> Vec<AbiItem> {
        sigs.iter().map(|s| parse_item(s).unwrap()).collect()
    }

    #[test]
    fn zero_arguments_pick_the_zero_parameter_overload() {
        let candidates = items(&["function foo()", "function foo(uint256)"]);
        let resolved = resolve_by_args(&candidates, &[]).unwrap();
        assert!(resolved.inputs().is_empty());
        assert_eq!(resolved.overloads().len(), 1);
    }

    #[test]
    fn address_vs_bytes20_is_always_ambiguous() {
        let candidates = items(&["function foo(address)", "function foo(bytes20)"]);
        let err = resolve_by_args(&candidates, &[AbiValue::address(VITALIK).unwrap()])
            .unwrap_err();
        match err {
            ResolveError::Ambiguity { sig_a, sig_b, ty_a, ty_b } => {
                assert!(sig_a.contains("foo(address)"));
                assert!(sig_b.contains("foo(bytes20)"));
                assert_eq!((ty_a.as_str(), ty_b.as_str()), ("address", "bytes20"));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn ambiguity_is_symmetric_in_candidate_order() {
        let forward = items(&["function foo(address)", "function foo(bytes20)"]);
        let reverse = items(&["function foo(bytes20)", "function foo(address)"]);
        let arg = [AbiValue::address(VITALIK).unwrap()];
        assert!(matches!(
            resolve_by_args(&forward, &arg),
            Err(ResolveError::Ambiguity { .. })
        ));
        assert!(matches!(
            resolve_by_args(&reverse, &arg),
            Err(ResolveError::Ambiguity { .. })
        ));
    }

    #[test]
    fn address_vs_string_depends_on_the_value() {
        let candidates = items(&["function foo(address)", "function foo(string)"]);

        // A well-formed address string satisfies both: ambiguous.
        let err =
            resolve_by_args(&candidates, &[AbiValue::String(VITALIK.into())]).unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguity { .. }));

        // One hex digit short: no longer a valid address, so only the
        // string overload matches.
        let malformed = &VITALIK[..VITALIK.len() - 1];
        let resolved =
            resolve_by_args(&candidates, &[AbiValue::String(malformed.into())]).unwrap();
        assert_eq!(resolved.inputs()[0].ty, AbiType::String);
    }

    #[test]
    fn distinct_shapes_resolve_without_ambiguity() {
        let candidates = items(&[
            "function transfer(address to, uint256 amount)",
            "function transfer(address to, uint256 amount, bytes data)",
        ]);
        let resolved = resolve_by_args(
            &candidates,
            &[AbiValue::address(VITALIK).unwrap(), AbiValue::uint(1)],
        )
        .unwrap();
        assert_eq!(resolved.inputs().len(), 2);
        assert_eq!(resolved.overloads().len(), 1);
    }

    #[test]
    fn no_compatible_candidate_is_not_found() {
        let candidates = items(&["function foo(uint256)"]);
        let err = resolve_by_args(&candidates, &[AbiValue::Bool(true)]).unwrap_err();
        assert_eq!(err, ResolveError::NotFound { name: "foo".into() });
    }

    #[test]
    fn resolve_by_selector_prefix() {
        let candidates = items(&[
            "function transfer(address to, uint256 amount)",
            "function transfer(address to)",
        ]);
        let calldata = hex::decode("a9059cbb").unwrap();
        let resolved = resolve_by_data(&candidates, &calldata, &Keccak256).unwrap();
        assert_eq!(resolved.inputs().len(), 2);
        assert_eq!(resolved.overloads().len(), 1);
    }

    #[test]
    fn resolve_event_by_topic() {
        let candidates = items(&[
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "event Transfer(address indexed from, uint256 value)",
        ]);
        let topic0 =
            hex::decode("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
                .unwrap();
        let resolved = resolve_by_data(&candidates, &topic0, &Keccak256).unwrap();
        assert_eq!(resolved.inputs().len(), 3);
    }

    #[test]
    fn unknown_selector_is_not_found() {
        let candidates = items(&["function transfer(address to, uint256 amount)"]);
        let err = resolve_by_data(&candidates, &[0xde, 0xad, 0xbe, 0xef], &Keccak256)
            .unwrap_err();
        assert_eq!(err, ResolveError::NotFound { name: "transfer".into() });
    }
}
