//! ABI parameter decoding — the inverse of the encoder.
//!
//! The byte stream carries no structure of its own: it is only interpretable
//! against the ordered parameter list supplied by the caller. Every word read
//! is preceded by a size check, so truncated data fails with a structured
//! error instead of producing a silently wrong value.

use abiforge_core::{
    error::CodecError,
    hash::Hasher,
    param::{AbiItem, AbiParameter},
    types::AbiType,
    value::AbiValue,
};
use alloy_primitives::{Address, I256, U256};

/// Decode `data` against `parameters`, returning one value per parameter.
///
/// Empty data against an empty parameter list is an empty result; empty data
/// against anything else is an error.
pub fn decode(parameters: &[AbiParameter], data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
    if data.is_empty() {
        if parameters.is_empty() {
            return Ok(Vec::new());
        }
        return Err(CodecError::ZeroData {
            params: format_params(parameters),
        });
    }
    let ctx = Ctx {
        params: parameters,
        data,
    };
    decode_sequence(parameters, data, &ctx)
}

/// Decode full calldata: verify the 4-byte selector, then decode the inputs.
pub fn decode_call(
    item: &AbiItem,
    data: &[u8],
    hasher: &dyn Hasher,
) -> Result<Vec<AbiValue>, CodecError> {
    let selector =
        abiforge_parser::selector(item, hasher).ok_or_else(|| CodecError::TypeMismatch {
            expected: "function or error".to_string(),
            got: item.kind().to_string(),
        })?;
    if data.len() < 4 {
        return Err(CodecError::InvalidData {
            reason: format!(
                "calldata too short: {} bytes (need at least 4 for selector)",
                data.len()
            ),
        });
    }
    if data[..4] != selector {
        return Err(CodecError::InvalidData {
            reason: format!(
                "selector mismatch: expected 0x{}, got 0x{}",
                hex::encode(selector),
                hex::encode(&data[..4])
            ),
        });
    }
    decode(item.inputs(), &data[4..])
}

/// Decode context carried down the recursion so size errors can report the
/// full parameter list and data, not just the slice that ran out.
struct Ctx<'a> {
    params: &'a [AbiParameter],
    data: &'a [u8],
}

impl Ctx<'_> {
    fn too_small(&self) -> CodecError {
        CodecError::DataSizeTooSmall {
            params: format_params(self.params),
            size: self.data.len(),
            data: hex::encode(self.data),
        }
    }
}

fn format_params(params: &[AbiParameter]) -> String {
    let parts: Vec<String> = params.iter().map(AbiParameter::canonical_type).collect();
    parts.join(", ")
}

fn decode_sequence(
    params: &[AbiParameter],
    region: &[u8],
    ctx: &Ctx<'_>,
) -> Result<Vec<AbiValue>, CodecError> {
    let mut values = Vec::with_capacity(params.len());
    let mut pos = 0;
    for param in params {
        if param.is_dynamic() {
            let offset = read_length(region, pos, ctx)?;
            if offset > region.len() {
                return Err(ctx.too_small());
            }
            values.push(decode_tail(param, &region[offset..], ctx)?);
            pos += 32;
        } else {
            values.push(decode_static(param, region, &mut pos, ctx)?);
        }
    }
    Ok(values)
}

fn decode_static(
    param: &AbiParameter,
    region: &[u8],
    pos: &mut usize,
    ctx: &Ctx<'_>,
) -> Result<AbiValue, CodecError> {
    match &param.ty {
        AbiType::Uint(_) => Ok(AbiValue::Uint(U256::from_be_bytes(read_word(
            region, pos, ctx,
        )?))),
        AbiType::Int(_) => Ok(AbiValue::Int(I256::from_be_bytes(read_word(
            region, pos, ctx,
        )?))),
        AbiType::Address => {
            let word = read_word(region, pos, ctx)?;
            Ok(AbiValue::Address(Address::from_slice(&word[12..])))
        }
        AbiType::Bool => {
            let word = read_word(region, pos, ctx)?;
            Ok(AbiValue::Bool(word[31] != 0))
        }
        AbiType::FixedBytes(n) => {
            let word = read_word(region, pos, ctx)?;
            Ok(AbiValue::FixedBytes(word[..*n].to_vec()))
        }
        AbiType::Array { len: Some(n), .. } => {
            let elem = param.element().expect("array parameter has an element");
            let mut elems = Vec::with_capacity(*n);
            for _ in 0..*n {
                elems.push(decode_static(&elem, region, pos, ctx)?);
            }
            Ok(AbiValue::Array(elems))
        }
        AbiType::Tuple => {
            let mut fields = Vec::with_capacity(param.components.len());
            for component in &param.components {
                fields.push(decode_static(component, region, pos, ctx)?);
            }
            Ok(AbiValue::Tuple(fields))
        }
        other => Err(CodecError::InvalidData {
            reason: format!("'{other}' cannot be decoded in a static position"),
        }),
    }
}

/// Decode a dynamic parameter's payload, whose region starts at its offset.
fn decode_tail(
    param: &AbiParameter,
    region: &[u8],
    ctx: &Ctx<'_>,
) -> Result<AbiValue, CodecError> {
    match &param.ty {
        AbiType::Bytes => Ok(AbiValue::Bytes(read_byte_payload(region, ctx)?)),
        AbiType::String => {
            let bytes = read_byte_payload(region, ctx)?;
            String::from_utf8(bytes)
                .map(AbiValue::String)
                .map_err(|e| CodecError::InvalidData {
                    reason: format!("string payload is not valid UTF-8: {e}"),
                })
        }
        AbiType::Array { len: None, .. } => {
            let count = read_length(region, 0, ctx)?;
            // Every element occupies at least one head word, so a count the
            // remaining region cannot hold is rejected before any allocation.
            if count > (region.len() - 32) / 32 {
                return Err(ctx.too_small());
            }
            let elem = param.element().expect("array parameter has an element");
            let params: Vec<AbiParameter> = std::iter::repeat(elem).take(count).collect();
            Ok(AbiValue::Array(decode_sequence(
                &params,
                &region[32..],
                ctx,
            )?))
        }
        AbiType::Array { len: Some(n), .. } => {
            let elem = param.element().expect("array parameter has an element");
            let params: Vec<AbiParameter> = std::iter::repeat(elem).take(*n).collect();
            Ok(AbiValue::Array(decode_sequence(&params, region, ctx)?))
        }
        AbiType::Tuple => Ok(AbiValue::Tuple(decode_sequence(
            &param.components,
            region,
            ctx,
        )?)),
        other => Err(CodecError::InvalidData {
            reason: format!("'{other}' cannot be decoded in a dynamic position"),
        }),
    }
}

/// Length word followed by that many content bytes. The comparison stays on
/// the subtraction side so an absurd wire length cannot overflow `32 + len`.
fn read_byte_payload(region: &[u8], ctx: &Ctx<'_>) -> Result<Vec<u8>, CodecError> {
    let len = read_length(region, 0, ctx)?;
    if region.len() - 32 < len {
        return Err(ctx.too_small());
    }
    Ok(region[32..32 + len].to_vec())
}

fn read_word(region: &[u8], pos: &mut usize, ctx: &Ctx<'_>) -> Result<[u8; 32], CodecError> {
    let word = peek_word(region, *pos, ctx)?;
    *pos += 32;
    Ok(word)
}

fn peek_word(region: &[u8], pos: usize, ctx: &Ctx<'_>) -> Result<[u8; 32], CodecError> {
    if region.len() < pos + 32 {
        return Err(ctx.too_small());
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&region[pos..pos + 32]);
    Ok(word)
}

/// Read an offset or count word. Anything beyond `u64` cannot address real
/// data, so the upper 24 bytes must be zero.
fn read_length(region: &[u8], pos: usize, ctx: &Ctx<'_>) -> Result<usize, CodecError> {
    let word = peek_word(region, pos, ctx)?;
    if word[..24].iter().any(|&b| b != 0) {
        return Err(CodecError::InvalidData {
            reason: format!("offset or length out of range: 0x{}", hex::encode(word)),
        });
    }
    let n = u64::from_be_bytes(word[24..].try_into().expect("8-byte slice"));
    usize::try_from(n).map_err(|_| CodecError::InvalidData {
        reason: format!("offset or length out of range: 0x{}", hex::encode(word)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode, usize_word};
    use abiforge_core::types::AbiType;

    fn param(ty: &str) -> AbiParameter {
        AbiParameter::unnamed(AbiType::parse(ty).unwrap())
    }

    #[test]
    fn roundtrip_address_uint() {
        let params = [param("address"), param("uint256")];
        let values = [
            AbiValue::address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap(),
            AbiValue::uint(123),
        ];
        let encoded = encode(&params, &values).unwrap();
        assert_eq!(decode(&params, &encoded).unwrap(), values);
    }

    #[test]
    fn roundtrip_nested_dynamic() {
        // (string, uint256[] , (bytes, bool)[2]) — depth ≥ 2 with dynamics
        let inner = AbiParameter::tuple(vec![param("bytes"), param("bool")]);
        let pairs = AbiParameter {
            ty: AbiType::Array {
                elem: Box::new(AbiType::Tuple),
                len: Some(2),
            },
            name: None,
            components: inner.components.clone(),
            indexed: None,
        };
        let params = [param("string"), param("uint256[]"), pairs];
        let values = [
            AbiValue::String("hello world, this is longer than one word".into()),
            AbiValue::Array(vec![AbiValue::uint(1), AbiValue::uint(2), AbiValue::uint(3)]),
            AbiValue::Array(vec![
                AbiValue::Tuple(vec![AbiValue::Bytes(vec![0xaa; 40]), AbiValue::Bool(true)]),
                AbiValue::Tuple(vec![AbiValue::Bytes(vec![]), AbiValue::Bool(false)]),
            ]),
        ];
        let encoded = encode(&params, &values).unwrap();
        assert_eq!(decode(&params, &encoded).unwrap(), values);
    }

    #[test]
    fn roundtrip_negative_ints() {
        let params = [param("int128"), param("int256")];
        let values = [
            AbiValue::Int(I256::try_from(-12345i128).unwrap()),
            AbiValue::Int(I256::MIN),
        ];
        let encoded = encode(&params, &values).unwrap();
        assert_eq!(decode(&params, &encoded).unwrap(), values);
    }

    #[test]
    fn zero_data_rules() {
        // Non-empty parameters: error
        let err = decode(&[param("uint256")], &[]).unwrap_err();
        assert!(matches!(err, CodecError::ZeroData { .. }));
        // Empty parameters: empty result
        assert_eq!(decode(&[], &[]).unwrap(), Vec::<AbiValue>::new());
    }

    #[test]
    fn truncation_always_fails_with_size_error() {
        let params = [param("string"), param("uint256[]")];
        let values = [
            AbiValue::String("truncate me".into()),
            AbiValue::Array(vec![AbiValue::uint(7), AbiValue::uint(8)]),
        ];
        let full = encode(&params, &values).unwrap();

        for cut in 1..full.len() {
            let truncated = &full[..full.len() - cut];
            match decode(&params, truncated) {
                Ok(decoded) => assert_eq!(decoded, values, "cut {cut} silently changed values"),
                Err(
                    CodecError::DataSizeTooSmall { .. }
                    | CodecError::ZeroData { .. }
                    | CodecError::InvalidData { .. },
                ) => {}
                Err(other) => panic!("unexpected error for cut {cut}: {other:?}"),
            }
        }
        // Removing even one byte of the final word must already fail
        assert!(matches!(
            decode(&params, &full[..full.len() - 1]),
            Err(CodecError::DataSizeTooSmall { .. })
        ));
    }

    #[test]
    fn hostile_array_count_is_a_size_error() {
        // offset word, then a count of 2^61 with no elements behind it
        let mut data = usize_word(32).to_vec();
        let mut count = [0u8; 32];
        count[24..].copy_from_slice(&(1u64 << 61).to_be_bytes());
        data.extend_from_slice(&count);

        let err = decode(&[param("uint256[]")], &data).unwrap_err();
        assert!(matches!(err, CodecError::DataSizeTooSmall { .. }));
    }

    #[test]
    fn hostile_bytes_length_is_a_size_error() {
        // offset word, then a length word of u64::MAX
        let mut data = usize_word(32).to_vec();
        let mut len = [0u8; 32];
        len[24..].copy_from_slice(&u64::MAX.to_be_bytes());
        data.extend_from_slice(&len);

        for ty in ["bytes", "string"] {
            let err = decode(&[param(ty)], &data).unwrap_err();
            assert!(matches!(err, CodecError::DataSizeTooSmall { .. }), "{ty}");
        }
    }

    #[test]
    fn size_error_reports_parameters_and_size() {
        let err = decode(&[param("uint256")], &[0u8; 16]).unwrap_err();
        match err {
            CodecError::DataSizeTooSmall { params, size, .. } => {
                assert_eq!(params, "uint256");
                assert_eq!(size, 16);
            }
            other => panic!("expected size error, got {other:?}"),
        }
    }

    #[test]
    fn bool_uses_low_order_byte() {
        let mut word = [0u8; 32];
        word[31] = 1;
        assert_eq!(
            decode(&[param("bool")], &word).unwrap(),
            vec![AbiValue::Bool(true)]
        );
        word[31] = 0;
        assert_eq!(
            decode(&[param("bool")], &word).unwrap(),
            vec![AbiValue::Bool(false)]
        );
    }
}
