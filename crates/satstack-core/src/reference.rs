//! Parsing of loosely-typed block and transaction references.

use std::str::FromStr;

use bitcoin::BlockHash;

use crate::error::CoreError;
use crate::types::BlockReference;

/// Literal that selects the best-chain tip.
pub const CURRENT: &str = "current";

/// Length of a 256-bit hash written as hex without prefix.
const HASH_HEX_LEN: usize = 64;

/// Parse a 256-bit hash written as hex, with or without a `0x` prefix.
///
/// Works for any of the `bitcoin` crate's hash newtypes (`Txid`,
/// `BlockHash`, ...), which read the usual reversed display order.
pub fn parse_hash<H>(input: &str) -> Result<H, CoreError>
where
    H: FromStr,
    H::Err: std::fmt::Display,
{
    let hex = input.strip_prefix("0x").unwrap_or(input);
    hex.parse().map_err(|e: H::Err| CoreError::MalformedHash {
        input: input.to_owned(),
        reason: e.to_string(),
    })
}

/// Turn an opaque block reference into a lookup key.
///
/// Classification order matters: anything prefixed with `0x` or exactly 64
/// characters long is a hash, so a 64-digit decimal string never reaches
/// the height branch.
pub fn parse_block_reference(input: &str) -> Result<BlockReference, CoreError> {
    if input == CURRENT {
        return Ok(BlockReference::Current);
    }

    if input.starts_with("0x") || input.len() == HASH_HEX_LEN {
        return parse_hash::<BlockHash>(input).map(BlockReference::Hash);
    }

    match input.parse::<i64>() {
        Ok(height) if height >= 0 => Ok(BlockReference::Height(height)),
        _ => Err(CoreError::InvalidBlockReference(input.to_owned())),
    }
}

impl FromStr for BlockReference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_block_reference(s)
    }
}
