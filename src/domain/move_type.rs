//! Sui addresses and Move type tags.
//!
//! Parsed once at config load so malformed ids or types never reach the
//! quoting loop, and again when a plan is lowered to its wire form.

use anyhow::{bail, Context, Result};
use serde::Serialize;

pub const ADDRESS_LENGTH: usize = 32;

pub type SuiAddress = [u8; ADDRESS_LENGTH];

/// Move type tag in BCS variant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructTag {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

/// Parse `0x`-prefixed hex, left-padding short forms like `0x6`.
pub fn parse_address(s: &str) -> Result<SuiAddress> {
    let digits = s
        .trim()
        .strip_prefix("0x")
        .with_context(|| format!("Address {s} is missing the 0x prefix"))?;
    if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
        bail!("Address {s} has invalid length");
    }

    let padded = format!("{digits:0>64}");
    let mut out = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(&padded, &mut out).with_context(|| format!("Address {s} is not hex"))?;
    Ok(out)
}

/// Canonical `0x` + 64 hex digit rendering.
pub fn format_address(addr: &SuiAddress) -> String {
    format!("0x{}", hex::encode(addr))
}

/// Parse a Move type such as `0x2::coin::Coin<0x2::sui::SUI>`.
pub fn parse_type_tag(s: &str) -> Result<TypeTag> {
    let s = s.trim();
    let tag = match s {
        "bool" => TypeTag::Bool,
        "u8" => TypeTag::U8,
        "u16" => TypeTag::U16,
        "u32" => TypeTag::U32,
        "u64" => TypeTag::U64,
        "u128" => TypeTag::U128,
        "u256" => TypeTag::U256,
        "address" => TypeTag::Address,
        "signer" => TypeTag::Signer,
        _ => {
            if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
                TypeTag::Vector(Box::new(parse_type_tag(inner)?))
            } else {
                TypeTag::Struct(Box::new(parse_struct_tag(s)?))
            }
        }
    };
    Ok(tag)
}

fn parse_struct_tag(s: &str) -> Result<StructTag> {
    let (head, type_params) = match s.find('<') {
        Some(open) => {
            let inner = s[open + 1..]
                .strip_suffix('>')
                .with_context(|| format!("Unbalanced type parameters in {s}"))?;
            let params = split_top_level(inner)?
                .into_iter()
                .map(parse_type_tag)
                .collect::<Result<Vec<_>>>()?;
            (&s[..open], params)
        }
        None => (s, Vec::new()),
    };

    let mut parts = head.split("::");
    let (Some(address), Some(module), Some(name), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("Expected address::module::Name, got {s}");
    };
    if module.is_empty() || name.is_empty() {
        bail!("Empty module or struct name in {s}");
    }

    Ok(StructTag {
        address: parse_address(address)?,
        module: module.to_string(),
        name: name.to_string(),
        type_params,
    })
}

/// Split on commas not nested inside `<...>`.
fn split_top_level(s: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .with_context(|| format!("Unbalanced '>' in {s}"))?;
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        bail!("Unbalanced '<' in {s}");
    }
    parts.push(s[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        bail!("Empty type parameter in {s}");
    }
    Ok(parts)
}
