//! RPC-specific types that do not belong to the shared domain model.
//!
//! Transactions are represented directly as [`RawTransaction`] from
//! `crate::types`; this module only defines structures that are specific
//! to other RPC methods.
//!
//! [`RawTransaction`]: crate::types::RawTransaction

use bitcoin::{BlockHash, Txid};
use serde::Deserialize;

// ==============================================================================
// Chain Info
// ==============================================================================

/// Basic chain information from `getblockchaininfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: BlockHash,
    pub pruned: bool,
}

// ==============================================================================
// Index Info
// ==============================================================================

/// Result of `getindexinfo`. Indexes the node does not run are absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexInfo {
    pub txindex: Option<IndexStatus>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IndexStatus {
    pub synced: bool,
    pub best_block_height: u64,
}

// ==============================================================================
// Blocks
// ==============================================================================

/// The fields of `getblock <hash> 1` that the block resolver uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerboseBlock {
    pub hash: BlockHash,
    pub height: u64,
    pub time: u64,
    #[serde(rename = "previousblockhash", default)]
    pub previous_block_hash: Option<BlockHash>,
    #[serde(rename = "tx")]
    pub txids: Vec<Txid>,
}

// ==============================================================================
// Wallet Transactions
// ==============================================================================

/// The fields of `gettransaction` that the wallet-scoped lookup relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletTransaction {
    /// Consensus-serialized transaction, hex-encoded.
    pub hex: String,
    /// Negative when the transaction conflicts with the best chain.
    pub confirmations: i64,
    #[serde(rename = "blockhash", default)]
    pub block_hash: Option<BlockHash>,
    #[serde(rename = "blocktime", default)]
    pub block_time: Option<u64>,
    pub time: u64,
}
