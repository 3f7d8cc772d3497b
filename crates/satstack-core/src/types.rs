//! Normalized domain types handed to the response layer.
//!
//! Contains the block reference key (`BlockReference`), the normalized block
//! (`Block`), the transaction shape shared by both lookup strategies
//! (`RawTransaction`, `TxInput`, `TxOutput`), and the spent-output view
//! (`OutputIdentifier`, `UtxoData`, `Utxos`).

use std::collections::HashMap;

use bitcoin::{Amount, BlockHash, ScriptBuf, Txid, Wtxid};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::rpc::VerboseBlock;

// ==============================================================================
// Block Reference
// ==============================================================================

/// Canonical lookup key for a block, parsed from a loosely-typed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReference {
    /// The best-chain tip at the time of the request.
    Current,
    Hash(BlockHash),
    /// A non-negative height on the best chain.
    Height(i64),
}

impl std::fmt::Display for BlockReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Hash(hash) => hash.fmt(f),
            Self::Height(height) => height.fmt(f),
        }
    }
}

// ==============================================================================
// Block
// ==============================================================================

/// A block as exposed upward: identity, position, time, and its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: BlockHash,
    pub height: u64,
    /// Block header time, in unix seconds.
    pub time: u64,
    /// `None` only for the genesis block.
    pub previous_block_hash: Option<BlockHash>,
    pub transactions: Vec<Txid>,
}

impl From<VerboseBlock> for Block {
    fn from(raw: VerboseBlock) -> Self {
        Self {
            hash: raw.hash,
            height: raw.height,
            time: raw.time,
            previous_block_hash: raw.previous_block_hash,
            transactions: raw.txids,
        }
    }
}

// ==============================================================================
// Transaction Types
// ==============================================================================

/// A transaction in the shape produced by both lookup strategies.
///
/// `confirmations`, `block_hash`, `block_time` and `time` come straight from
/// a verbose `getrawtransaction` when the node has a transaction index, and
/// are copied from the wallet record otherwise. A freshly decoded
/// transaction carries none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: Txid,
    pub hash: Wtxid,
    pub version: i32,
    pub locktime: u32,
    pub size: u64,
    pub vsize: u64,
    pub weight: u64,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Zero for unconfirmed transactions.
    pub confirmations: u64,
    pub block_hash: Option<BlockHash>,
    pub block_time: Option<u64>,
    pub time: Option<u64>,
}

impl RawTransaction {
    /// A coinbase transaction has exactly one input and it mints coins.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase()
    }
}

/// A transaction input: either the coinbase marker or a spend of a
/// previous output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxInput {
    Coinbase {
        /// Hex-encoded coinbase script.
        coinbase: String,
        sequence: u32,
    },
    Spend {
        prevout: OutputIdentifier,
        sequence: u32,
    },
}

impl TxInput {
    pub fn is_coinbase(&self) -> bool {
        matches!(self, Self::Coinbase { .. })
    }

    pub fn prevout(&self) -> Option<&OutputIdentifier> {
        match self {
            Self::Coinbase { .. } => None,
            Self::Spend { prevout, .. } => Some(prevout),
        }
    }
}

/// A transaction output as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub n: u32,
    /// Decimal BTC amount exactly as the node reported it. Converted to
    /// satoshis only when a UTXO is extracted from it.
    pub value: String,
    pub script_pub_key: ScriptBuf,
    /// Addresses the script pays to. Empty for non-standard and data
    /// outputs; more than one for bare multisig on older nodes.
    pub addresses: Vec<String>,
}

// ==============================================================================
// Spent Outputs
// ==============================================================================

/// Identifies one output across the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputIdentifier {
    pub hash: Txid,
    pub index: u32,
}

impl OutputIdentifier {
    pub fn new(hash: Txid, index: u32) -> Self {
        Self { hash, index }
    }
}

impl std::fmt::Display for OutputIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.hash, self.index)
    }
}

/// Value and (optional) address of an output consumed by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoData {
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub value: Amount,
    /// `None` exactly when the output's script exposes no address.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
}

/// Outputs consumed by one transaction, keyed by the output they spend.
///
/// Serializes as a JSON object keyed by `"<txid>:<index>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utxos(pub HashMap<OutputIdentifier, UtxoData>);

impl Utxos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &OutputIdentifier) -> Option<&UtxoData> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: OutputIdentifier, data: UtxoData) {
        self.0.insert(id, data);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Utxos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, data) in &self.0 {
            map.serialize_entry(&id.to_string(), data)?;
        }
        map.end()
    }
}

// ==============================================================================
// Transaction View
// ==============================================================================

/// A resolved transaction together with the outputs its inputs consume.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: RawTransaction,
    pub utxos: Utxos,
}
