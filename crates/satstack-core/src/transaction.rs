//! Transaction lookup that works with or without a node-side transaction
//! index.
//!
//! With `-txindex` the node answers verbose `getrawtransaction` for any
//! confirmed transaction. Without it only wallet-relevant transactions are
//! reachable, through `gettransaction`, whose hex must then be decoded and
//! re-annotated with the confirmation metadata the decoder drops. Callers
//! see the same [`RawTransaction`] shape either way.

use bitcoin::hex::FromHex;
use bitcoin::Txid;
use tracing::debug;

use crate::config::NodeConfig;
use crate::error::CoreError;
use crate::reference::parse_hash;
use crate::rpc::NodeRpc;
use crate::types::{RawTransaction, TransactionView, Utxos};
use crate::utxo::build_utxos;

/// How transactions are looked up on the node, chosen once from
/// [`NodeConfig::tx_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxLookup {
    /// Verbose `getrawtransaction` against the full index.
    Indexed,
    /// `gettransaction` (watch-only included) + `decoderawtransaction`.
    Wallet,
}

impl TxLookup {
    pub fn for_config(config: &NodeConfig) -> Self {
        if config.tx_index {
            Self::Indexed
        } else {
            Self::Wallet
        }
    }
}

/// Resolves transaction hashes against one node with a fixed lookup
/// strategy.
pub struct TransactionResolver<'a> {
    rpc: &'a dyn NodeRpc,
    lookup: TxLookup,
}

impl<'a> TransactionResolver<'a> {
    pub fn new(rpc: &'a dyn NodeRpc, config: &NodeConfig) -> Self {
        Self::with_lookup(rpc, TxLookup::for_config(config))
    }

    pub fn with_lookup(rpc: &'a dyn NodeRpc, lookup: TxLookup) -> Self {
        Self { rpc, lookup }
    }

    pub fn lookup(&self) -> TxLookup {
        self.lookup
    }

    /// Resolve a transaction hash given as hex, with or without `0x`.
    pub async fn resolve_transaction(&self, hash: &str) -> Result<RawTransaction, CoreError> {
        let txid = parse_hash::<Txid>(hash)?;
        self.resolve_txid(&txid).await
    }

    pub async fn resolve_txid(&self, txid: &Txid) -> Result<RawTransaction, CoreError> {
        debug!(%txid, lookup = ?self.lookup, "resolving transaction");
        match self.lookup {
            TxLookup::Indexed => self.rpc.get_raw_transaction_verbose(txid).await,
            TxLookup::Wallet => self.resolve_through_wallet(txid).await,
        }
    }

    /// Resolve a transaction and the outputs its inputs consume.
    pub async fn resolve_transaction_view(&self, hash: &str) -> Result<TransactionView, CoreError> {
        let transaction = self.resolve_transaction(hash).await?;
        let utxos = if transaction.is_coinbase() {
            Utxos::new()
        } else {
            build_utxos(self, &transaction.inputs).await?
        };
        Ok(TransactionView { transaction, utxos })
    }

    async fn resolve_through_wallet(&self, txid: &Txid) -> Result<RawTransaction, CoreError> {
        let record = self.rpc.get_wallet_transaction(txid, true).await?;
        let serialized = Vec::<u8>::from_hex(&record.hex)
            .map_err(|e| CoreError::MalformedTransaction(format!("invalid hex for {txid}: {e}")))?;
        let decoded = self.rpc.decode_raw_transaction(&serialized).await?;

        // The decoder knows nothing about where the transaction sits in the
        // chain; that comes from the wallet record.
        Ok(RawTransaction {
            // A conflicted wallet transaction reports negative confirmations.
            confirmations: u64::try_from(record.confirmations).unwrap_or(0),
            block_hash: record.block_hash,
            block_time: record.block_time,
            time: Some(record.time),
            ..decoded
        })
    }
}
