//! Selector and topic derivation.
//!
//! The canonical signature text (`name(type1,type2,...)`, tuples spelled out,
//! no names or whitespace) is handed to an injected [`Hasher`]; the first
//! 4 bytes identify functions and errors, the full 32 bytes identify events
//! (topic zero). The hash itself is a collaborator, never implemented here.

use abiforge_core::{hash::Hasher, param::AbiItem};

/// The canonical signature text whose hash is the selector.
/// `None` for constructor/fallback/receive, which have no name to hash.
pub fn canonical_signature(item: &AbiItem) -> Option<String> {
    let name = item.name()?;
    let types: Vec<String> = item
        .inputs()
        .iter()
        .map(|p| p.canonical_type())
        .collect();
    Some(format!("{name}({})", types.join(",")))
}

/// 4-byte selector for functions and errors.
pub fn selector(item: &AbiItem, hasher: &dyn Hasher) -> Option<[u8; 4]> {
    match item {
        AbiItem::Function { .. } | AbiItem::Error { .. } => {
            let digest = hasher.hash(canonical_signature(item)?.as_bytes());
            Some([digest[0], digest[1], digest[2], digest[3]])
        }
        _ => None,
    }
}

/// 32-byte topic zero for events.
pub fn topic(item: &AbiItem, hasher: &dyn Hasher) -> Option<[u8; 32]> {
    match item {
        AbiItem::Event { .. } => Some(hasher.hash(canonical_signature(item)?.as_bytes())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_item;
    use abiforge_core::hash::Keccak256;

    #[test]
    fn transfer_selector() {
        let item = parse_item("function transfer(address to, uint256 amount)").unwrap();
        assert_eq!(
            canonical_signature(&item).unwrap(),
            "transfer(address,uint256)"
        );
        assert_eq!(
            hex::encode(selector(&item, &Keccak256).unwrap()),
            "a9059cbb"
        );
    }

    #[test]
    fn whitespace_does_not_change_the_selector() {
        let a = parse_item("function transfer(address to, uint256 amount)").unwrap();
        let b = parse_item("function   transfer( address to ,  uint256   amount )").unwrap();
        assert_eq!(selector(&a, &Keccak256), selector(&b, &Keccak256));
    }

    #[test]
    fn transfer_event_topic() {
        let item =
            parse_item("event Transfer(address indexed from, address indexed to, uint256 value)")
                .unwrap();
        assert_eq!(
            hex::encode(topic(&item, &Keccak256).unwrap()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn tuples_are_spelled_out() {
        let item = parse_item("function submit((address maker, uint256 amount) order)").unwrap();
        assert_eq!(
            canonical_signature(&item).unwrap(),
            "submit((address,uint256))"
        );
    }

    #[test]
    fn constructor_has_no_selector() {
        let item = parse_item("constructor(address owner)").unwrap();
        assert!(canonical_signature(&item).is_none());
        assert!(selector(&item, &Keccak256).is_none());
    }
}
