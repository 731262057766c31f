//! The signature grammar.
//!
//! A recursive-descent parser over single signature strings. Splitting a
//! comma-separated list tracks parenthesis depth character by character, so
//! commas inside nested tuples never split, and each unbalanced side is
//! reported distinctly. Whitespace is only a separator: `""` parses to an
//! empty parameter list, never to a list holding one empty parameter.

use abiforge_core::{
    error::{ParenSide, SignatureError},
    param::{AbiItem, AbiParameter, StateMutability},
    types::AbiType,
};
use std::fmt;

/// The surrounding context a parameter is parsed in. Modifier validity
/// depends on it: `indexed` is only legal in event inputs, the data-location
/// modifiers only in function and error inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamContext {
    Function,
    Event,
    Error,
    Struct,
    None,
}

impl fmt::Display for ParamContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamContext::Function => write!(f, "function"),
            ParamContext::Event => write!(f, "event"),
            ParamContext::Error => write!(f, "error"),
            ParamContext::Struct => write!(f, "struct"),
            ParamContext::None => write!(f, "plain"),
        }
    }
}

/// Names that cannot be used as parameter names.
const RESERVED: &[&str] = &[
    "address", "after", "alias", "anonymous", "apply", "auto", "bool", "byte", "bytes",
    "calldata", "case", "catch", "constant", "constructor", "copyof", "default", "defined",
    "error", "event", "external", "fallback", "false", "final", "function", "immutable",
    "implements", "in", "indexed", "inline", "int", "internal", "let", "mapping", "match",
    "memory", "mutable", "null", "of", "override", "partial", "payable", "private", "promise",
    "public", "pure", "receive", "reference", "relocatable", "return", "returns", "sealed",
    "sizeof", "static", "storage", "string", "struct", "super", "supports", "switch", "this",
    "true", "try", "tuple", "typedef", "typeof", "uint", "var", "view", "virtual",
];

// ─── Public API ───────────────────────────────────────────────────────────────

/// Parse a whole-item signature. Struct declarations and struct-typed
/// parameters are not accepted here — those need batch context, see
/// [`crate::parse_abi`].
pub fn parse_item(signature: &str) -> Result<AbiItem, SignatureError> {
    let item = parse_item_loose(signature)?;
    for param in item.inputs() {
        ensure_resolved(param)?;
    }
    if let AbiItem::Function { outputs, .. } = &item {
        for param in outputs {
            ensure_resolved(param)?;
        }
    }
    Ok(item)
}

/// Parse a bare comma-separated parameter list, e.g.
/// `"address owner, uint256 balance"`.
pub fn parse_parameters(list: &str, ctx: ParamContext) -> Result<Vec<AbiParameter>, SignatureError> {
    let params = parse_parameters_loose(list, ctx)?;
    for param in &params {
        ensure_resolved(param)?;
    }
    Ok(params)
}

/// Parse a single formal parameter, e.g. `"uint256[2] amounts"`.
pub fn parse_parameter(source: &str, ctx: ParamContext) -> Result<AbiParameter, SignatureError> {
    let param = parse_parameter_loose(source, ctx)?;
    ensure_resolved(&param)?;
    Ok(param)
}

// ─── Item parsing ─────────────────────────────────────────────────────────────

/// Parse an item, leaving struct references as `AbiType::Custom`.
pub(crate) fn parse_item_loose(signature: &str) -> Result<AbiItem, SignatureError> {
    let sig = signature.trim();
    let invalid = || SignatureError::InvalidSignature {
        signature: sig.to_string(),
    };

    if let Some(rest) = sig.strip_prefix("function ") {
        return parse_function(rest.trim_start(), sig);
    }
    if let Some(rest) = sig.strip_prefix("event ") {
        let (name, inputs, trailing) = parse_named(rest.trim_start(), ParamContext::Event, sig)?;
        let anonymous = match trailing {
            "" => false,
            "anonymous" => true,
            _ => return Err(invalid()),
        };
        return Ok(AbiItem::Event {
            name,
            inputs,
            anonymous,
            overloads: Vec::new(),
        });
    }
    if let Some(rest) = sig.strip_prefix("error ") {
        let (name, inputs, trailing) = parse_named(rest.trim_start(), ParamContext::Error, sig)?;
        if !trailing.is_empty() {
            return Err(invalid());
        }
        return Ok(AbiItem::Error {
            name,
            inputs,
            overloads: Vec::new(),
        });
    }
    if let Some(rest) = strip_keyword(sig, "constructor") {
        if !rest.starts_with('(') {
            return Err(invalid());
        }
        let (inner, trailing) = take_paren_group(rest, sig)?;
        let inputs = parse_parameters_loose(inner, ParamContext::Function)?;
        let state_mutability = parse_trailing_mutability(trailing, sig)?;
        return Ok(AbiItem::Constructor {
            inputs,
            state_mutability,
        });
    }
    if let Some(rest) = strip_keyword(sig, "fallback") {
        let (inner, trailing) = take_paren_group(rest, sig)?;
        if !inner.trim().is_empty() {
            return Err(invalid());
        }
        let state_mutability = parse_trailing_mutability(trailing, sig)?;
        return Ok(AbiItem::Fallback { state_mutability });
    }
    if let Some(rest) = strip_keyword(sig, "receive") {
        let (inner, trailing) = take_paren_group(rest, sig)?;
        if !inner.trim().is_empty() {
            return Err(invalid());
        }
        // "external payable" is conventional but optional
        for tok in trailing.split_whitespace() {
            if tok != "external" && tok != "payable" {
                return Err(invalid());
            }
        }
        return Ok(AbiItem::Receive);
    }
    if sig.starts_with("struct ") {
        // Struct declarations only make sense in a batch; see parse_abi.
        return Err(invalid());
    }

    // Shorthand: `Name(params)` is accepted as a function signature.
    if sig
        .find('(')
        .map(|i| is_identifier(&sig[..i]))
        .unwrap_or(false)
    {
        return parse_function(sig, sig);
    }
    Err(invalid())
}

/// Strip a leading keyword only at a word boundary, so `receiveTokens(...)`
/// is not mistaken for a `receive` declaration.
fn strip_keyword<'a>(sig: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = sig.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if c == '(' || c.is_whitespace() => Some(rest.trim_start()),
        None => Some(rest),
        _ => None,
    }
}

fn parse_function(rest: &str, whole: &str) -> Result<AbiItem, SignatureError> {
    let invalid = || SignatureError::InvalidSignature {
        signature: whole.to_string(),
    };

    let open = rest.find('(').ok_or_else(invalid)?;
    let name = rest[..open].trim();
    if !is_identifier(name) {
        return Err(invalid());
    }
    let (inner, trailing) = take_paren_group(&rest[open..], whole)?;
    let inputs = parse_parameters_loose(inner, ParamContext::Function)?;

    let (mutability_part, outputs) = match find_returns(trailing) {
        Some(idx) => {
            let ret = trailing[idx + "returns".len()..].trim_start();
            if !ret.starts_with('(') {
                return Err(invalid());
            }
            let (ret_inner, ret_trailing) = take_paren_group(ret, whole)?;
            if !ret_trailing.is_empty() {
                return Err(invalid());
            }
            (
                &trailing[..idx],
                parse_parameters_loose(ret_inner, ParamContext::Function)?,
            )
        }
        None => (trailing, Vec::new()),
    };

    let state_mutability = parse_trailing_mutability(mutability_part, whole)?;
    Ok(AbiItem::Function {
        name: name.to_string(),
        inputs,
        outputs,
        state_mutability,
        overloads: Vec::new(),
    })
}

fn parse_named<'a>(
    rest: &'a str,
    ctx: ParamContext,
    whole: &str,
) -> Result<(String, Vec<AbiParameter>, &'a str), SignatureError> {
    let invalid = || SignatureError::InvalidSignature {
        signature: whole.to_string(),
    };
    let open = rest.find('(').ok_or_else(invalid)?;
    let name = rest[..open].trim();
    if !is_identifier(name) {
        return Err(invalid());
    }
    let (inner, trailing) = take_paren_group(&rest[open..], whole)?;
    let inputs = parse_parameters_loose(inner, ctx)?;
    Ok((name.to_string(), inputs, trailing))
}

/// `view | pure | payable | nonpayable`, at most once; visibility keywords
/// are accepted and dropped.
fn parse_trailing_mutability(part: &str, whole: &str) -> Result<StateMutability, SignatureError> {
    let mut found: Option<StateMutability> = None;
    for tok in part.split_whitespace() {
        let mutability = match tok {
            "view" => StateMutability::View,
            "pure" => StateMutability::Pure,
            "payable" => StateMutability::Payable,
            "nonpayable" => StateMutability::Nonpayable,
            "external" | "public" => continue,
            _ => {
                return Err(SignatureError::InvalidSignature {
                    signature: whole.to_string(),
                })
            }
        };
        if found.is_some() {
            return Err(SignatureError::InvalidSignature {
                signature: whole.to_string(),
            });
        }
        found = Some(mutability);
    }
    Ok(found.unwrap_or_default())
}

/// Position of a standalone `returns` keyword, ignoring identifiers that
/// merely contain it.
fn find_returns(s: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(rel) = s[search..].find("returns") {
        let idx = search + rel;
        let before_ok = idx == 0 || s[..idx].ends_with(char::is_whitespace);
        let after = &s[idx + "returns".len()..];
        let after_ok = after.is_empty() || after.starts_with(char::is_whitespace) || after.starts_with('(');
        if before_ok && after_ok {
            return Some(idx);
        }
        search = idx + "returns".len();
    }
    None
}

// ─── Parameter parsing ────────────────────────────────────────────────────────

pub(crate) fn parse_parameters_loose(
    list: &str,
    ctx: ParamContext,
) -> Result<Vec<AbiParameter>, SignatureError> {
    split_top_level(list)?
        .into_iter()
        .map(|part| parse_parameter_loose(part, ctx))
        .collect()
}

pub(crate) fn parse_parameter_loose(
    source: &str,
    ctx: ParamContext,
) -> Result<AbiParameter, SignatureError> {
    let s = source.trim();
    if s.is_empty() {
        return Err(SignatureError::InvalidParameter {
            param: source.to_string(),
        });
    }

    if s.starts_with('(') {
        let (inner, rest) = take_paren_group(s, s)?;
        let components = split_top_level(inner)?
            .into_iter()
            .map(|part| parse_parameter_loose(part, ParamContext::None))
            .collect::<Result<Vec<_>, _>>()?;
        let (ty, rest) = take_array_suffixes(AbiType::Tuple, rest, s)?;
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let (name, indexed) = parse_trailing_tokens(&tokens, ctx, s)?;
        return Ok(AbiParameter {
            ty,
            name,
            components,
            indexed,
        });
    }

    let mut tokens = s.split_whitespace();
    let type_token = tokens.next().ok_or_else(|| SignatureError::InvalidParameter {
        param: s.to_string(),
    })?;
    let ty = AbiType::parse_loose(type_token)?;
    let rest: Vec<&str> = tokens.collect();
    let (name, indexed) = parse_trailing_tokens(&rest, ctx, s)?;
    Ok(AbiParameter {
        ty,
        name,
        components: Vec::new(),
        indexed,
    })
}

/// `[modifier] [name]` after the type.
fn parse_trailing_tokens(
    tokens: &[&str],
    ctx: ParamContext,
    whole: &str,
) -> Result<(Option<String>, Option<bool>), SignatureError> {
    match tokens {
        [] => Ok((None, None)),
        [one] => {
            if is_modifier(one) {
                validate_modifier(one, ctx)?;
                Ok((None, indexed_flag(one)))
            } else {
                validate_name(one)?;
                Ok((Some(one.to_string()), None))
            }
        }
        [modifier, name] => {
            if !is_modifier(modifier) {
                return Err(SignatureError::InvalidParameter {
                    param: whole.to_string(),
                });
            }
            validate_modifier(modifier, ctx)?;
            validate_name(name)?;
            Ok((Some(name.to_string()), indexed_flag(modifier)))
        }
        _ => Err(SignatureError::InvalidParameter {
            param: whole.to_string(),
        }),
    }
}

fn is_modifier(tok: &str) -> bool {
    matches!(tok, "indexed" | "calldata" | "memory" | "storage")
}

fn indexed_flag(modifier: &str) -> Option<bool> {
    (modifier == "indexed").then_some(true)
}

fn validate_modifier(modifier: &str, ctx: ParamContext) -> Result<(), SignatureError> {
    let valid = match modifier {
        "indexed" => ctx == ParamContext::Event,
        "calldata" | "memory" | "storage" => {
            ctx == ParamContext::Function || ctx == ParamContext::Error
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SignatureError::InvalidModifier {
            modifier: modifier.to_string(),
            context: ctx.to_string(),
        })
    }
}

fn validate_name(name: &str) -> Result<(), SignatureError> {
    if RESERVED.contains(&name) {
        return Err(SignatureError::ReservedKeyword {
            name: name.to_string(),
        });
    }
    if !is_identifier(name) {
        return Err(SignatureError::InvalidParameter {
            param: name.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn ensure_resolved(param: &AbiParameter) -> Result<(), SignatureError> {
    if let AbiType::Custom(name) = param.ty.base() {
        return Err(SignatureError::UnknownType {
            ty: name.clone(),
        });
    }
    param.components.iter().try_for_each(ensure_resolved)
}

// ─── Splitting helpers ────────────────────────────────────────────────────────

/// Split a comma-separated list at the top nesting level only.
pub(crate) fn split_top_level(list: &str) -> Result<Vec<&str>, SignatureError> {
    let trimmed = list.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut depth: i32 = 0;
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in trimmed.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(SignatureError::UnbalancedParentheses {
                        value: trimmed.to_string(),
                        side: ParenSide::Closing,
                    });
                }
            }
            ',' if depth == 0 => {
                parts.push(trimmed[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err(SignatureError::UnbalancedParentheses {
            value: trimmed.to_string(),
            side: ParenSide::Opening,
        });
    }
    parts.push(trimmed[start..].trim());

    for part in &parts {
        if part.is_empty() {
            return Err(SignatureError::InvalidParameter {
                param: trimmed.to_string(),
            });
        }
    }
    Ok(parts)
}

/// Consume a leading `(` group, returning `(inner, rest)` with `rest`
/// trimmed at the front.
fn take_paren_group<'a>(s: &'a str, whole: &str) -> Result<(&'a str, &'a str), SignatureError> {
    if !s.starts_with('(') {
        return Err(SignatureError::InvalidSignature {
            signature: whole.to_string(),
        });
    }
    let mut depth: i32 = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&s[1..i], s[i + 1..].trim_start()));
                }
            }
            _ => {}
        }
    }
    Err(SignatureError::UnbalancedParentheses {
        value: whole.to_string(),
        side: ParenSide::Opening,
    })
}

/// Consume `[N]`/`[]` suffixes directly attached to a tuple's closing
/// parenthesis. Wrapping left to right leaves the rightmost dimension
/// outermost, matching elementary type tokens.
fn take_array_suffixes<'a>(
    mut ty: AbiType,
    mut rest: &'a str,
    whole: &str,
) -> Result<(AbiType, &'a str), SignatureError> {
    while rest.starts_with('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| SignatureError::InvalidArrayDimension {
                ty: whole.to_string(),
            })?;
        let dim = &rest[1..close];
        let len = if dim.is_empty() {
            None
        } else {
            Some(
                dim.parse::<usize>()
                    .map_err(|_| SignatureError::InvalidArrayDimension {
                        ty: whole.to_string(),
                    })?,
            )
        };
        ty = AbiType::Array {
            elem: Box::new(ty),
            len,
        };
        rest = &rest[close + 1..];
    }
    Ok((ty, rest.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_function_with_returns_and_mutability() {
        let item = parse_item("function balanceOf(address owner) view returns (uint256)").unwrap();
        match &item {
            AbiItem::Function {
                name,
                inputs,
                outputs,
                state_mutability,
                ..
            } => {
                assert_eq!(name, "balanceOf");
                assert_eq!(inputs.len(), 1);
                assert_eq!(inputs[0].name.as_deref(), Some("owner"));
                assert_eq!(outputs, &[AbiParameter::unnamed(AbiType::Uint(256))]);
                assert_eq!(*state_mutability, StateMutability::View);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parse_event_with_indexed() {
        let item =
            parse_item("event Transfer(address indexed from, address indexed to, uint256 value)")
                .unwrap();
        let inputs = item.inputs();
        assert_eq!(inputs[0].indexed, Some(true));
        assert_eq!(inputs[2].indexed, None);
    }

    #[test]
    fn indexed_outside_event_rejected() {
        let err = parse_item("function foo(address indexed from)").unwrap_err();
        assert!(matches!(err, SignatureError::InvalidModifier { .. }));
    }

    #[test]
    fn data_location_modifiers_allowed_in_functions_only() {
        assert!(parse_item("function foo(bytes calldata data)").is_ok());
        assert!(parse_item("error Revert(string memory reason)").is_ok());
        let err = parse_item("event E(bytes calldata data)").unwrap_err();
        assert!(matches!(err, SignatureError::InvalidModifier { .. }));
    }

    #[test]
    fn reserved_keyword_as_name_rejected() {
        let err = parse_parameter("uint256 view", ParamContext::Function).unwrap_err();
        assert_eq!(
            err,
            SignatureError::ReservedKeyword {
                name: "view".into()
            }
        );
    }

    #[test]
    fn constructor_formats_back() {
        let item = parse_item("constructor(address owner)").unwrap();
        assert_eq!(item.to_string(), "constructor(address owner)");
    }

    #[test]
    fn fallback_and_receive() {
        assert!(matches!(
            parse_item("fallback() external").unwrap(),
            AbiItem::Fallback { .. }
        ));
        assert!(matches!(
            parse_item("fallback() external payable").unwrap(),
            AbiItem::Fallback {
                state_mutability: StateMutability::Payable
            }
        ));
        assert_eq!(parse_item("receive() external payable").unwrap(), AbiItem::Receive);
    }

    #[test]
    fn nested_tuple_parameters() {
        let params = parse_parameters(
            "(address owner, (uint256 x, uint256 y) point) data, bool flag",
            ParamContext::None,
        )
        .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ty, AbiType::Tuple);
        assert_eq!(params[0].components.len(), 2);
        assert_eq!(params[0].components[1].components.len(), 2);
        assert_eq!(params[0].canonical_type(), "(address,(uint256,uint256))");
    }

    #[test]
    fn tuple_array_suffix() {
        let param = parse_parameter("(address,uint256)[2] pairs", ParamContext::None).unwrap();
        assert_eq!(
            param.ty,
            AbiType::Array {
                elem: Box::new(AbiType::Tuple),
                len: Some(2),
            }
        );
        assert_eq!(param.name.as_deref(), Some("pairs"));
    }

    #[test]
    fn empty_list_is_empty_not_one_empty_param() {
        assert!(parse_parameters("", ParamContext::None).unwrap().is_empty());
        assert!(parse_parameters("   ", ParamContext::None).unwrap().is_empty());
    }

    #[test]
    fn unbalanced_parens_name_the_side() {
        let err = parse_parameters("((address a)", ParamContext::None).unwrap_err();
        assert!(matches!(
            err,
            SignatureError::UnbalancedParentheses {
                side: ParenSide::Opening,
                ..
            }
        ));
        let err = parse_parameters("(address a))", ParamContext::None).unwrap_err();
        assert!(matches!(
            err,
            SignatureError::UnbalancedParentheses {
                side: ParenSide::Closing,
                ..
            }
        ));
    }

    #[test]
    fn commas_inside_tuples_do_not_split() {
        let params =
            parse_parameters("(uint256, bool) pair, address to", ParamContext::None).unwrap();
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn unknown_type_rejected_without_struct_context() {
        let err = parse_item("function foo(Point p)").unwrap_err();
        assert_eq!(err, SignatureError::UnknownType { ty: "Point".into() });
    }

    #[test]
    fn shorthand_signature_is_a_function() {
        let item = parse_item("transfer(address,uint256)").unwrap();
        assert_eq!(item.kind(), "function");
        assert_eq!(item.name(), Some("transfer"));
    }

    #[test]
    fn keyword_prefixed_names_are_plain_functions() {
        let item = parse_item("receiveTokens(uint256 amount)").unwrap();
        assert_eq!(item.name(), Some("receiveTokens"));
        let item = parse_item("fallbackHandler(address)").unwrap();
        assert_eq!(item.name(), Some("fallbackHandler"));
    }

    #[test]
    fn returns_keyword_boundary() {
        // A parameter named "returnsValue" must not be mistaken for the clause
        let item = parse_item("function f(uint256 returnsValue)").unwrap();
        assert_eq!(item.inputs()[0].name.as_deref(), Some("returnsValue"));
    }
}
