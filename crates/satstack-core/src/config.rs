//! Immutable description of the node being queried.

use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::rpc::{ChainInfo, NodeRpc};

/// Read-only facts about the queried node, fixed at startup and passed
/// explicitly to every resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeConfig {
    /// Chain name as reported by `getblockchaininfo` (`main`, `test`, ...).
    pub chain: String,
    pub pruned: bool,
    /// Whether the node keeps a full transaction index (`-txindex=1`).
    pub tx_index: bool,
    /// Currency identifier used by downstream wallets for this chain.
    pub currency: String,
}

impl NodeConfig {
    pub fn new(chain: &str, pruned: bool, tx_index: bool) -> Result<Self, CoreError> {
        let currency = currency_for_chain(chain)?;
        Ok(Self {
            chain: chain.to_owned(),
            pruned,
            tx_index,
            currency: currency.to_owned(),
        })
    }

    pub fn from_chain_info(info: &ChainInfo, tx_index: bool) -> Result<Self, CoreError> {
        Self::new(&info.chain, info.pruned, tx_index)
    }
}

/// Map a Bitcoin Core chain name to the wallet currency identifier.
pub fn currency_for_chain(chain: &str) -> Result<&'static str, CoreError> {
    match chain {
        "main" => Ok("bitcoin"),
        "test" | "testnet4" | "signet" | "regtest" => Ok("bitcoin_testnet"),
        other => Err(CoreError::Config(format!(
            "unrecognized chain name `{other}`"
        ))),
    }
}

/// Ask the node whether its transaction index is usable. Nodes without
/// `getindexinfo`, or whose index is still syncing, get wallet lookups.
pub async fn detect_tx_index(rpc: &dyn NodeRpc) -> bool {
    match rpc.get_index_info().await {
        Ok(info) => match info.txindex {
            Some(status) if status.synced => true,
            Some(status) => {
                info!(
                    best_block_height = status.best_block_height,
                    "txindex is still syncing; falling back to wallet lookups"
                );
                false
            }
            None => false,
        },
        Err(err) => {
            info!(error = %err, "getindexinfo unavailable; assuming no txindex");
            false
        }
    }
}
