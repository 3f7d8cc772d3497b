//! Shared test helpers for `satstack-core` unit tests.
//!
//! Builders for transactions that exist both as consensus-serialized
//! `bitcoin::Transaction`s and as node-shaped `RawTransaction`s (so the
//! wallet-scoped path can decode real hex), for blocks, and a tracing
//! capture used to assert on warning logs.

use std::io;
use std::sync::{Arc, Mutex};

use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::transaction::Version;
use bitcoin::{Amount, BlockHash, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::rpc::VerboseBlock;
use crate::types::{OutputIdentifier, RawTransaction, TxInput, TxOutput};

// ==============================================================================
// Hash Helpers
// ==============================================================================

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

pub fn block_hash_from_byte(b: u8) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[31] = b;
    BlockHash::from_byte_array(bytes)
}

// ==============================================================================
// Transaction Builders
// ==============================================================================

/// A coinbase input.
pub fn coinbase_input() -> TxInput {
    TxInput::Coinbase {
        coinbase: "03a0bb0d".into(),
        sequence: 0xFFFFFFFF,
    }
}

/// A spending input referencing `funding_txid:vout`.
pub fn spend_input(funding_txid: Txid, vout: u32) -> TxInput {
    TxInput::Spend {
        prevout: OutputIdentifier::new(funding_txid, vout),
        sequence: 0xFFFFFFFE,
    }
}

/// An output worth `value` BTC (decimal text, as the node reports it)
/// paying to `addresses`. `n` is assigned by [`make_tx`].
pub fn output_to(value: &str, addresses: &[&str]) -> TxOutput {
    // Minimal valid P2WPKH scriptPubKey: OP_0 PUSH20 <20-byte-hash>.
    let mut script = vec![0x00, 0x14];
    script.extend_from_slice(&[0x11; 20]);
    TxOutput {
        n: 0,
        value: value.to_owned(),
        script_pub_key: ScriptBuf::from_bytes(script),
        addresses: addresses.iter().map(|a| (*a).to_owned()).collect(),
    }
}

/// Build a transaction in both shapes. `seed` goes into the locktime so
/// that otherwise identical fixtures get distinct txids.
///
/// `inputs` must not be empty: a zero-input transaction is ambiguous with
/// the segwit marker and would not decode.
pub fn make_tx(
    seed: u8,
    inputs: Vec<TxInput>,
    mut outputs: Vec<TxOutput>,
) -> (Transaction, RawTransaction) {
    assert!(!inputs.is_empty(), "fixture transactions need an input");

    for (n, output) in outputs.iter_mut().enumerate() {
        output.n = n as u32;
    }

    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::from_consensus(u32::from(seed)),
        input: inputs
            .iter()
            .map(|input| match input {
                TxInput::Coinbase { sequence, .. } => TxIn {
                    previous_output: OutPoint::null(),
                    script_sig: ScriptBuf::from_bytes(vec![0x01, seed]),
                    sequence: Sequence(*sequence),
                    witness: Witness::new(),
                },
                TxInput::Spend { prevout, sequence } => TxIn {
                    previous_output: OutPoint::new(prevout.hash, prevout.index),
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence(*sequence),
                    witness: Witness::new(),
                },
            })
            .collect(),
        output: outputs
            .iter()
            .map(|output| TxOut {
                value: Amount::from_sat(1_000),
                script_pubkey: output.script_pub_key.clone(),
            })
            .collect(),
    };

    let raw = RawTransaction {
        txid: tx.compute_txid(),
        hash: tx.compute_wtxid(),
        version: 2,
        locktime: u32::from(seed),
        size: tx.total_size() as u64,
        vsize: tx.vsize() as u64,
        weight: tx.weight().to_wu(),
        inputs,
        outputs,
        confirmations: 0,
        block_hash: None,
        block_time: None,
        time: None,
    };

    (tx, raw)
}

/// Attach confirmation metadata as a node would report it.
pub fn confirmed(raw: RawTransaction, block_hash: BlockHash, confirmations: u64) -> RawTransaction {
    RawTransaction {
        confirmations,
        block_hash: Some(block_hash),
        block_time: Some(1_700_000_000),
        time: Some(1_700_000_000),
        ..raw
    }
}

// ==============================================================================
// Block Builders
// ==============================================================================

pub fn make_block(height: u64, hash_byte: u8, previous: Option<BlockHash>) -> VerboseBlock {
    VerboseBlock {
        hash: block_hash_from_byte(hash_byte),
        height,
        time: 1_700_000_000 + height,
        previous_block_hash: previous,
        txids: vec![txid_from_byte(hash_byte)],
    }
}

// ==============================================================================
// Log Capture
// ==============================================================================

/// Collects formatted tracing output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install as the thread-local default subscriber until the guard drops.
    /// Use with current-thread runtimes only.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log capture lock poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log capture lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
