use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bitcoin::consensus::encode::{deserialize, serialize_hex};
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, Transaction, Txid};

use crate::error::{CoreError, RpcError};
use crate::types::RawTransaction;

use super::types::{ChainInfo, IndexInfo, IndexStatus, VerboseBlock, WalletTransaction};
use super::NodeRpc;

/// A mock node for testing. Serves canned blocks and transactions from
/// in-memory maps populated via the builder pattern.
///
/// The three transaction stores mirror what a real node exposes: the full
/// index, the wallet (consensus-serialized hex plus metadata), and what
/// `decoderawtransaction` yields for a given transaction (no metadata).
pub struct MockRpc {
    blocks: HashMap<BlockHash, VerboseBlock>,
    heights: BTreeMap<i64, BlockHash>,
    indexed: HashMap<Txid, RawTransaction>,
    wallet: HashMap<Txid, WalletTransaction>,
    decoded: HashMap<Txid, RawTransaction>,
    chain_info: ChainInfo,
    index_info: Option<IndexInfo>,
}

impl MockRpc {
    pub fn builder() -> MockRpcBuilder {
        MockRpcBuilder {
            blocks: HashMap::new(),
            heights: BTreeMap::new(),
            indexed: HashMap::new(),
            wallet: HashMap::new(),
            decoded: HashMap::new(),
            chain_info: ChainInfo {
                chain: "regtest".into(),
                blocks: 100,
                best_block_hash: BlockHash::all_zeros(),
                pruned: false,
            },
            index_info: Some(IndexInfo::default()),
        }
    }
}

pub struct MockRpcBuilder {
    blocks: HashMap<BlockHash, VerboseBlock>,
    heights: BTreeMap<i64, BlockHash>,
    indexed: HashMap<Txid, RawTransaction>,
    wallet: HashMap<Txid, WalletTransaction>,
    decoded: HashMap<Txid, RawTransaction>,
    chain_info: ChainInfo,
    index_info: Option<IndexInfo>,
}

impl MockRpcBuilder {
    /// Add a block on the best chain. The highest block becomes the tip.
    pub fn with_block(mut self, block: VerboseBlock) -> Self {
        let height = i64::try_from(block.height).expect("test block height fits i64");
        self.heights.insert(height, block.hash);
        self.blocks.insert(block.hash, block);
        self
    }

    /// Make `raw` visible through the full transaction index.
    pub fn with_indexed_tx(mut self, raw: RawTransaction) -> Self {
        self.indexed.insert(raw.txid, raw);
        self
    }

    /// Make `raw` visible to the wallet. `tx` must be the consensus form of
    /// `raw` (same txid); its hex is what `gettransaction` hands back.
    pub fn with_wallet_tx(mut self, tx: &Transaction, raw: RawTransaction) -> Self {
        assert_eq!(tx.compute_txid(), raw.txid, "wallet fixture txid mismatch");
        self.wallet.insert(
            raw.txid,
            WalletTransaction {
                hex: serialize_hex(tx),
                confirmations: i64::try_from(raw.confirmations).expect("fits i64"),
                block_hash: raw.block_hash,
                block_time: raw.block_time,
                time: raw.time.unwrap_or(0),
            },
        );
        self.decoded.insert(
            raw.txid,
            RawTransaction {
                confirmations: 0,
                block_hash: None,
                block_time: None,
                time: None,
                ..raw
            },
        );
        self
    }

    /// Register a wallet record verbatim, e.g. one whose hex is corrupt.
    pub fn with_wallet_record(mut self, txid: Txid, record: WalletTransaction) -> Self {
        self.wallet.insert(txid, record);
        self
    }

    pub fn with_chain_info(mut self, info: ChainInfo) -> Self {
        self.chain_info = info;
        self
    }

    pub fn with_txindex(mut self, synced: bool) -> Self {
        self.index_info = Some(IndexInfo {
            txindex: Some(IndexStatus {
                synced,
                best_block_height: self.chain_info.blocks,
            }),
        });
        self
    }

    /// Behave like a node predating `getindexinfo`.
    pub fn without_index_info(mut self) -> Self {
        self.index_info = None;
        self
    }

    pub fn build(self) -> MockRpc {
        MockRpc {
            blocks: self.blocks,
            heights: self.heights,
            indexed: self.indexed,
            wallet: self.wallet,
            decoded: self.decoded,
            chain_info: self.chain_info,
            index_info: self.index_info,
        }
    }
}

#[async_trait]
impl NodeRpc for MockRpc {
    async fn get_best_block_hash(&self) -> Result<BlockHash, CoreError> {
        self.heights
            .values()
            .next_back()
            .copied()
            .ok_or_else(|| CoreError::BlockNotFound("current".into()))
    }

    async fn get_block_hash(&self, height: i64) -> Result<BlockHash, CoreError> {
        self.heights
            .get(&height)
            .copied()
            .ok_or_else(|| CoreError::BlockNotFound(height.to_string()))
    }

    async fn get_verbose_block(&self, hash: &BlockHash) -> Result<VerboseBlock, CoreError> {
        self.blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| CoreError::BlockNotFound(hash.to_string()))
    }

    async fn get_raw_transaction_verbose(
        &self,
        txid: &Txid,
    ) -> Result<RawTransaction, CoreError> {
        self.indexed
            .get(txid)
            .cloned()
            .ok_or(CoreError::TxNotFound(*txid))
    }

    async fn get_wallet_transaction(
        &self,
        txid: &Txid,
        _include_watch_only: bool,
    ) -> Result<WalletTransaction, CoreError> {
        self.wallet
            .get(txid)
            .cloned()
            .ok_or(CoreError::TxNotFound(*txid))
    }

    async fn decode_raw_transaction(&self, raw: &[u8]) -> Result<RawTransaction, CoreError> {
        let tx: Transaction =
            deserialize(raw).map_err(|e| CoreError::MalformedTransaction(e.to_string()))?;
        let txid = tx.compute_txid();
        self.decoded.get(&txid).cloned().ok_or_else(|| {
            CoreError::MalformedTransaction(format!("no decoded fixture for {txid}"))
        })
    }

    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        Ok(self.chain_info.clone())
    }

    async fn get_index_info(&self) -> Result<IndexInfo, CoreError> {
        self.index_info.clone().ok_or_else(|| {
            CoreError::Rpc(RpcError::ServerError {
                code: -32601,
                message: "Method not found".into(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::hex::FromHex;

    use super::*;
    use crate::test_util::*;

    #[tokio::test]
    async fn with_chain_info_overrides_defaults() {
        let custom_info = ChainInfo {
            chain: "main".into(),
            blocks: 800_000,
            best_block_hash: BlockHash::all_zeros(),
            pruned: true,
        };
        let rpc = MockRpc::builder().with_chain_info(custom_info).build();
        let info = rpc.get_blockchain_info().await.unwrap();
        assert_eq!(info.chain, "main");
        assert_eq!(info.blocks, 800_000);
        assert!(info.pruned);
    }

    #[tokio::test]
    async fn wallet_store_round_trips_through_decode() {
        let (tx, raw) = make_tx(3, vec![coinbase_input()], vec![output_to("0.5", &["bcrt1qa"])]);
        let raw = confirmed(raw, block_hash_from_byte(9), 4);
        let rpc = MockRpc::builder().with_wallet_tx(&tx, raw.clone()).build();

        let record = rpc.get_wallet_transaction(&raw.txid, true).await.unwrap();
        assert_eq!(record.confirmations, 4);

        let bytes = Vec::<u8>::from_hex(&record.hex).unwrap();
        let decoded = rpc.decode_raw_transaction(&bytes).await.unwrap();
        assert_eq!(decoded.txid, raw.txid);
        assert_eq!(decoded.confirmations, 0);
        assert!(decoded.block_hash.is_none());
    }

    #[tokio::test]
    async fn tip_is_highest_block() {
        let rpc = MockRpc::builder()
            .with_block(make_block(0, 1, None))
            .with_block(make_block(2, 3, Some(block_hash_from_byte(2))))
            .with_block(make_block(1, 2, Some(block_hash_from_byte(1))))
            .build();
        assert_eq!(
            rpc.get_best_block_hash().await.unwrap(),
            block_hash_from_byte(3)
        );
    }
}
