//! Bitcoin Core RPC abstraction layer.
//!
//! Defines the [`NodeRpc`] trait and provides an HTTP JSON-RPC
//! implementation ([`HttpRpcClient`]) plus a test mock (`mock::MockRpc`).

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use http_adapter::HttpRpcClient;
pub use types::{ChainInfo, IndexInfo, IndexStatus, VerboseBlock, WalletTransaction};

use async_trait::async_trait;
use bitcoin::{BlockHash, Txid};

use crate::error::CoreError;
use crate::types::RawTransaction;

/// The primitive node operations the resolvers are built on.
///
/// Implementations own authentication, connection management, retries and
/// timeouts, and are expected to map "no such block/transaction" replies to
/// [`CoreError::BlockNotFound`] / [`CoreError::TxNotFound`].
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Hash of the best-chain tip.
    async fn get_best_block_hash(&self) -> Result<BlockHash, CoreError>;

    /// Hash of the best-chain block at `height`.
    async fn get_block_hash(&self, height: i64) -> Result<BlockHash, CoreError>;

    /// Verbose block (`getblock <hash> 1`).
    async fn get_verbose_block(&self, hash: &BlockHash) -> Result<VerboseBlock, CoreError>;

    /// Verbose transaction from the node's full transaction index. Only
    /// works for confirmed transactions when the node runs with `-txindex`.
    async fn get_raw_transaction_verbose(&self, txid: &Txid)
        -> Result<RawTransaction, CoreError>;

    /// Wallet-scoped lookup (`gettransaction`). Only sees transactions the
    /// node's wallet is aware of.
    async fn get_wallet_transaction(
        &self,
        txid: &Txid,
        include_watch_only: bool,
    ) -> Result<WalletTransaction, CoreError>;

    /// Decode a consensus-serialized transaction. The result carries no
    /// confirmation or block metadata.
    async fn decode_raw_transaction(&self, raw: &[u8]) -> Result<RawTransaction, CoreError>;

    /// Basic chain info (network, block count, pruning status).
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError>;

    /// State of the node's optional indexes.
    async fn get_index_info(&self) -> Result<IndexInfo, CoreError>;
}
