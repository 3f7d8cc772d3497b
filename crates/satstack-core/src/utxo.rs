//! Reconstruction of the outputs a transaction's inputs consume.
//!
//! Two phases with two error disciplines:
//!
//! 1. [`resolve_prevouts`] looks up each input's previous transaction. A
//!    lookup failure is logged and the input skipped: the previous
//!    transaction may simply belong to a wallet this node does not track.
//! 2. [`extract_utxos`] pulls the spent output out of each resolved
//!    transaction. Failure here means the node returned malformed data and
//!    aborts the whole build.

use std::collections::HashMap;

use bitcoin::{Amount, Denomination};
use tracing::warn;

use crate::error::CoreError;
use crate::transaction::TransactionResolver;
use crate::types::{OutputIdentifier, RawTransaction, TxInput, UtxoData, Utxos};

/// Build the UTXO view for `inputs`.
///
/// The result holds one entry per input whose previous transaction could
/// be resolved; coinbase inputs and unresolvable inputs are absent.
pub async fn build_utxos(
    resolver: &TransactionResolver<'_>,
    inputs: &[TxInput],
) -> Result<Utxos, CoreError> {
    let resolved = resolve_prevouts(resolver, inputs).await;
    extract_utxos(&resolved)
}

/// Phase 1: map each spent output to its (resolved) funding transaction.
pub async fn resolve_prevouts(
    resolver: &TransactionResolver<'_>,
    inputs: &[TxInput],
) -> HashMap<OutputIdentifier, RawTransaction> {
    let mut resolved = HashMap::with_capacity(inputs.len());

    for input in inputs {
        // Coinbase inputs mint coins; there is no previous output.
        let Some(prevout) = input.prevout() else {
            continue;
        };

        match resolver.resolve_txid(&prevout.hash).await {
            Ok(tx) => {
                resolved.insert(*prevout, tx);
            }
            Err(err) => {
                warn!(
                    hash = %prevout.hash,
                    vout = prevout.index,
                    error = %err,
                    "skipping input whose previous transaction the node cannot resolve"
                );
            }
        }
    }

    resolved
}

/// Phase 2: extract and classify every resolved output. All-or-nothing.
pub fn extract_utxos(
    resolved: &HashMap<OutputIdentifier, RawTransaction>,
) -> Result<Utxos, CoreError> {
    let mut utxos = Utxos::new();
    for (id, tx) in resolved {
        utxos.insert(*id, parse_utxo(tx, id.index)?);
    }
    Ok(utxos)
}

/// Extract output `index` of `tx`.
///
/// Address policy: none when the script exposes no address, the address
/// when there is one, and the first address for multisig outputs (logged,
/// since downstream consumers only ever see that one).
pub fn parse_utxo(tx: &RawTransaction, index: u32) -> Result<UtxoData, CoreError> {
    let output = tx
        .outputs
        .get(index as usize)
        .ok_or_else(|| {
            CoreError::InvalidTxData(format!(
                "transaction {} has no output {index} ({} outputs)",
                tx.txid,
                tx.outputs.len()
            ))
        })?;
    let value = parse_satoshi(&output.value)?;

    let address = match output.addresses.as_slice() {
        [] => None,
        [address] => Some(address.clone()),
        [first, ..] => {
            warn!(
                addresses = ?output.addresses,
                value = value.to_sat(),
                output_index = index,
                "multisig output detected; keeping only the first address"
            );
            Some(first.clone())
        }
    };

    Ok(UtxoData { value, address })
}

/// Convert a decimal BTC amount, as printed by the node, to satoshis.
///
/// Plain decimals are parsed exactly. Scientific notation (which some
/// JSON encoders emit for small numbers) goes through `f64`, which is
/// exact for any amount with at most 8 decimal places.
pub fn parse_satoshi(value: &str) -> Result<Amount, CoreError> {
    let text = value.trim();
    let parsed = if text.contains(|c: char| c == 'e' || c == 'E') {
        text.parse::<f64>()
            .map_err(|e| e.to_string())
            .and_then(|btc| {
                Amount::from_float_in(btc, Denomination::Bitcoin).map_err(|e| e.to_string())
            })
    } else {
        Amount::from_str_in(text, Denomination::Bitcoin).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| CoreError::AmountParse {
        value: value.to_owned(),
        reason,
    })
}
