//! ABI parameter encoding.
//!
//! Head/tail layout: one head slot per parameter, in order. Static values
//! are written inline (recursively, so a static tuple or fixed array spans
//! several words of head); dynamic values write a 32-byte offset into a tail
//! region appended after all head slots, and the payload at that offset
//! repeats the same scheme one level down.

use abiforge_core::{
    error::CodecError,
    hash::Hasher,
    param::{AbiItem, AbiParameter},
    types::AbiType,
    value::AbiValue,
};

/// Encode `values` against `parameters`, 1:1 and in order.
pub fn encode(parameters: &[AbiParameter], values: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    if parameters.len() != values.len() {
        return Err(CodecError::LengthMismatch {
            expected: parameters.len(),
            given: values.len(),
        });
    }
    encode_sequence(parameters, values)
}

/// Encode full calldata: 4-byte selector followed by the encoded inputs.
/// Only functions and errors have selectors.
pub fn encode_call(
    item: &AbiItem,
    values: &[AbiValue],
    hasher: &dyn Hasher,
) -> Result<Vec<u8>, CodecError> {
    let selector =
        abiforge_parser::selector(item, hasher).ok_or_else(|| CodecError::TypeMismatch {
            expected: "function or error".to_string(),
            got: item.kind().to_string(),
        })?;
    let mut out = selector.to_vec();
    out.extend_from_slice(&encode(item.inputs(), values)?);
    Ok(out)
}

fn encode_sequence(params: &[AbiParameter], values: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    let head_total: usize = params.iter().map(head_width).sum();
    let mut head = Vec::with_capacity(head_total);
    let mut tail = Vec::new();

    for (param, value) in params.iter().zip(values) {
        if param.is_dynamic() {
            head.extend_from_slice(&usize_word(head_total + tail.len()));
            encode_tail(param, value, &mut tail)?;
        } else {
            encode_static(param, value, &mut head)?;
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

/// Width a parameter occupies in the head region. Dynamic parameters hold
/// a single offset word; static tuples and fixed arrays are inlined.
fn head_width(param: &AbiParameter) -> usize {
    if param.is_dynamic() {
        return 32;
    }
    match &param.ty {
        AbiType::Array { len: Some(n), .. } => {
            let elem = param.element().expect("array parameter has an element");
            n * head_width(&elem)
        }
        AbiType::Tuple => param.components.iter().map(head_width).sum(),
        _ => 32,
    }
}

fn encode_static(
    param: &AbiParameter,
    value: &AbiValue,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match (&param.ty, value) {
        (AbiType::Uint(_), AbiValue::Uint(u)) => {
            out.extend_from_slice(&u.to_be_bytes::<32>());
            Ok(())
        }
        (AbiType::Int(_), AbiValue::Int(i)) => {
            out.extend_from_slice(&i.to_be_bytes::<32>());
            Ok(())
        }
        (AbiType::Address, AbiValue::Address(a)) => {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(a.as_slice());
            Ok(())
        }
        (AbiType::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            out.extend_from_slice(&word);
            Ok(())
        }
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(b) | AbiValue::Bytes(b)) => {
            if b.len() != *n {
                return Err(CodecError::BytesSizeMismatch {
                    expected: *n,
                    given: b.len(),
                });
            }
            let mut word = [0u8; 32];
            word[..b.len()].copy_from_slice(b);
            out.extend_from_slice(&word);
            Ok(())
        }
        (AbiType::Array { len: Some(n), .. }, AbiValue::Array(elems)) => {
            check_array_len(param, *n, elems.len())?;
            let elem = param.element().expect("array parameter has an element");
            for e in elems {
                encode_static(&elem, e, out)?;
            }
            Ok(())
        }
        (AbiType::Tuple, AbiValue::Tuple(fields)) => {
            check_tuple_arity(param, fields.len())?;
            for (component, field) in param.components.iter().zip(fields) {
                encode_static(component, field, out)?;
            }
            Ok(())
        }
        _ => Err(mismatch(param, value)),
    }
}

/// Encode the tail payload of a dynamic parameter.
fn encode_tail(
    param: &AbiParameter,
    value: &AbiValue,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match (&param.ty, value) {
        (AbiType::String, AbiValue::String(s)) => {
            encode_byte_payload(s.as_bytes(), out);
            Ok(())
        }
        (AbiType::Bytes, AbiValue::Bytes(b)) => {
            encode_byte_payload(b, out);
            Ok(())
        }
        (AbiType::Array { len, .. }, AbiValue::Array(elems)) => {
            if let Some(n) = len {
                check_array_len(param, *n, elems.len())?;
            } else {
                out.extend_from_slice(&usize_word(elems.len()));
            }
            let elem = param.element().expect("array parameter has an element");
            let params: Vec<AbiParameter> = std::iter::repeat(elem).take(elems.len()).collect();
            out.extend_from_slice(&encode_sequence(&params, elems)?);
            Ok(())
        }
        (AbiType::Tuple, AbiValue::Tuple(fields)) => {
            check_tuple_arity(param, fields.len())?;
            out.extend_from_slice(&encode_sequence(&param.components, fields)?);
            Ok(())
        }
        _ => Err(mismatch(param, value)),
    }
}

/// Length word followed by the content, right-padded to a word boundary.
fn encode_byte_payload(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        out.extend_from_slice(&[0u8; 32][..32 - rem]);
    }
}

fn check_array_len(param: &AbiParameter, expected: usize, given: usize) -> Result<(), CodecError> {
    if expected != given {
        return Err(CodecError::ArrayLengthMismatch {
            ty: param.canonical_type(),
            expected,
            given,
        });
    }
    Ok(())
}

fn check_tuple_arity(param: &AbiParameter, given: usize) -> Result<(), CodecError> {
    if param.components.len() != given {
        return Err(CodecError::LengthMismatch {
            expected: param.components.len(),
            given,
        });
    }
    Ok(())
}

fn mismatch(param: &AbiParameter, value: &AbiValue) -> CodecError {
    CodecError::TypeMismatch {
        expected: param.canonical_type(),
        got: value.kind().to_string(),
    }
}

pub(crate) fn usize_word(n: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiforge_core::types::AbiType;
    use alloy_primitives::{I256, U256};

    fn param(ty: &str) -> AbiParameter {
        AbiParameter::unnamed(AbiType::parse(ty).unwrap())
    }

    #[test]
    fn encode_address_uint_pair() {
        let encoded = encode(
            &[param("address"), param("uint256")],
            &[
                AbiValue::address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap(),
                AbiValue::uint(123),
            ],
        )
        .unwrap();

        assert_eq!(
            hex::encode(&encoded),
            "000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045\
             000000000000000000000000000000000000000000000000000000000000007b"
        );
    }

    #[test]
    fn encode_string_head_tail_layout() {
        let encoded = encode(
            &[param("string")],
            &[AbiValue::String("wagmi".to_string())],
        )
        .unwrap();

        // offset 0x20, length 5, "wagmi" right-padded
        assert_eq!(
            hex::encode(&encoded),
            "0000000000000000000000000000000000000000000000000000000000000020\
             0000000000000000000000000000000000000000000000000000000000000005\
             7761676d69000000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn encode_negative_int_two_complement() {
        let encoded = encode(
            &[param("int256")],
            &[AbiValue::Int(I256::try_from(-1i128).unwrap())],
        )
        .unwrap();
        assert_eq!(encoded, vec![0xff; 32]);
    }

    #[test]
    fn length_mismatch_reports_both_sides() {
        let err = encode(&[param("uint256")], &[]).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                expected: 1,
                given: 0
            }
        );
    }

    #[test]
    fn fixed_array_length_enforced() {
        let err = encode(
            &[param("uint256[2]")],
            &[AbiValue::Array(vec![AbiValue::uint(1)])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CodecError::ArrayLengthMismatch {
                ty: "uint256[2]".into(),
                expected: 2,
                given: 1
            }
        );
    }

    #[test]
    fn fixed_bytes_size_enforced() {
        let err = encode(
            &[param("bytes4")],
            &[AbiValue::FixedBytes(vec![1, 2, 3])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CodecError::BytesSizeMismatch {
                expected: 4,
                given: 3
            }
        );
    }

    #[test]
    fn static_tuple_is_inlined() {
        let p = AbiParameter::tuple(vec![param("uint256"), param("bool")]);
        let encoded = encode(
            &[p],
            &[AbiValue::Tuple(vec![AbiValue::uint(7), AbiValue::Bool(true)])],
        )
        .unwrap();
        // No offset word: two inline words
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 1);
    }

    #[test]
    fn dynamic_array_payload_has_count() {
        let encoded = encode(
            &[param("uint256[]")],
            &[AbiValue::Array(vec![AbiValue::uint(1), AbiValue::uint(2)])],
        )
        .unwrap();
        // offset + count + 2 elements
        assert_eq!(encoded.len(), 128);
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(2u64));
    }

    #[test]
    fn determinism() {
        let params = [param("string"), param("uint256[]")];
        let values = [
            AbiValue::String("abc".into()),
            AbiValue::Array(vec![AbiValue::uint(9)]),
        ];
        assert_eq!(
            encode(&params, &values).unwrap(),
            encode(&params, &values).unwrap()
        );
    }
}
