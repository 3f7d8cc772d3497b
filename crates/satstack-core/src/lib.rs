pub mod block;
pub mod config;
pub mod error;
pub mod reference;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod utxo;

#[cfg(test)]
mod test_util;

pub use block::{resolve_block, resolve_block_hash};
pub use config::NodeConfig;
pub use error::{CoreError, RpcError};
pub use transaction::{TransactionResolver, TxLookup};
pub use types::{
    Block, BlockReference, OutputIdentifier, RawTransaction, TransactionView, UtxoData, Utxos,
};
pub use utxo::build_utxos;
