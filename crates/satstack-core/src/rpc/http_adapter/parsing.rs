use bitcoin::{BlockHash, ScriptBuf, Txid, Wtxid};

use crate::error::CoreError;
use crate::types::{OutputIdentifier, RawTransaction, TxInput, TxOutput};

/// Parse the object returned by verbose `getrawtransaction` or by
/// `decoderawtransaction`. The two share a layout; the latter simply lacks
/// `confirmations`, `blockhash`, `blocktime` and `time`.
pub(super) fn parse_raw_transaction(raw: &serde_json::Value) -> Result<RawTransaction, CoreError> {
    let txid = parse_hash_field::<Txid>(raw.get("txid"), "txid")?;
    let hash = parse_hash_field::<Wtxid>(raw.get("hash"), "hash")?;
    let version = parse_integer_required::<i32, true>(raw.get("version"), "version")?;
    let locktime = parse_integer_required::<u32, false>(raw.get("locktime"), "locktime")?;
    let size = parse_integer_required::<u64, false>(raw.get("size"), "size")?;
    let vsize = parse_integer_required::<u64, false>(raw.get("vsize"), "vsize")?;
    let weight = parse_integer_required::<u64, false>(raw.get("weight"), "weight")?;

    let vin = raw
        .get("vin")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| CoreError::InvalidTxData("missing vin array".into()))?;
    let vout = raw
        .get("vout")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| CoreError::InvalidTxData("missing vout array".into()))?;

    Ok(RawTransaction {
        txid,
        hash,
        version,
        locktime,
        size,
        vsize,
        weight,
        inputs: parse_vin(vin)?,
        outputs: parse_vout(vout)?,
        confirmations: parse_integer_optional::<u64, false>(raw.get("confirmations"))
            .unwrap_or(0),
        block_hash: parse_opt_block_hash(raw.get("blockhash"))?,
        block_time: parse_integer_optional::<u64, false>(raw.get("blocktime")),
        time: parse_integer_optional::<u64, false>(raw.get("time")),
    })
}

pub(super) fn parse_hash_field<H>(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<H, CoreError>
where
    H: std::str::FromStr,
    H::Err: std::fmt::Display,
{
    let value = value
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CoreError::InvalidTxData(format!("missing {field}")))?;
    value
        .parse()
        .map_err(|e: H::Err| CoreError::InvalidTxData(format!("invalid {field}: {e}")))
}

fn parse_opt_block_hash(value: Option<&serde_json::Value>) -> Result<Option<BlockHash>, CoreError> {
    match value.and_then(serde_json::Value::as_str) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|e| CoreError::InvalidTxData(format!("invalid blockhash: {e}"))),
    }
}

fn parse_integer_required<T, const SIGNED: bool>(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<T, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    parse_integer::<T, SIGNED, true>(value, field)?
        .ok_or_else(|| CoreError::InvalidTxData(format!("missing {field}")))
}

fn parse_integer_optional<T, const SIGNED: bool>(value: Option<&serde_json::Value>) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    parse_integer::<T, SIGNED, false>(value, "value")
        .ok()
        .flatten()
}

// `REQUIRED=false` treats missing/null/type-mismatch as `Ok(None)`.
fn parse_integer<T, const SIGNED: bool, const REQUIRED: bool>(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<Option<T>, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let missing_or_none = || {
        if REQUIRED {
            Err(CoreError::InvalidTxData(format!("missing {field}")))
        } else {
            Ok(None)
        }
    };

    let Some(value) = value else {
        return missing_or_none();
    };

    if SIGNED {
        let Some(n) = value.as_i64() else {
            return missing_or_none();
        };
        T::try_from(n)
            .map(Some)
            .map_err(|_| CoreError::InvalidTxData(format!("{field} out of range: {n}")))
    } else {
        let Some(n) = value.as_u64() else {
            return missing_or_none();
        };
        T::try_from(n)
            .map(Some)
            .map_err(|_| CoreError::InvalidTxData(format!("{field} out of range: {n}")))
    }
}

fn parse_vin(vin: &[serde_json::Value]) -> Result<Vec<TxInput>, CoreError> {
    vin.iter()
        .map(|input| {
            let sequence = parse_integer_required::<u32, false>(input.get("sequence"), "sequence")?;

            if let Some(coinbase) = input.get("coinbase") {
                let coinbase = coinbase
                    .as_str()
                    .ok_or_else(|| CoreError::InvalidTxData("vin.coinbase is not hex".into()))?;
                return Ok(TxInput::Coinbase {
                    coinbase: coinbase.to_owned(),
                    sequence,
                });
            }

            let hash = parse_hash_field::<Txid>(input.get("txid"), "vin.txid")?;
            let index = parse_integer_required::<u32, false>(input.get("vout"), "vin.vout")?;
            Ok(TxInput::Spend {
                prevout: OutputIdentifier::new(hash, index),
                sequence,
            })
        })
        .collect()
}

fn parse_vout(vout: &[serde_json::Value]) -> Result<Vec<TxOutput>, CoreError> {
    vout.iter()
        .map(|output| {
            let value = value_text(
                output
                    .get("value")
                    .ok_or_else(|| CoreError::InvalidTxData("missing value in vout".into()))?,
            )?;
            let n = parse_integer_required::<u32, false>(output.get("n"), "vout.n")?;
            let spk = output
                .get("scriptPubKey")
                .ok_or_else(|| CoreError::InvalidTxData("missing scriptPubKey in vout".into()))?;

            Ok(TxOutput {
                n,
                value,
                script_pub_key: parse_script_pubkey(spk)?,
                addresses: parse_addresses(spk),
            })
        })
        .collect()
}

/// Keep the node's amount as text. Strings pass through; numbers keep the
/// representation `serde_json` gives them, which may be scientific for
/// small values.
fn value_text(value: &serde_json::Value) -> Result<String, CoreError> {
    match value {
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Err(CoreError::InvalidTxData(format!(
            "expected numeric BTC amount, got: {other}"
        ))),
    }
}

/// Older nodes report an `addresses` array (several entries for bare
/// multisig); Bitcoin Core 22+ reports a single `address` when the script
/// has one.
fn parse_addresses(spk: &serde_json::Value) -> Vec<String> {
    if let Some(list) = spk.get("addresses").and_then(serde_json::Value::as_array) {
        return list
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(str::to_owned)
            .collect();
    }

    spk.get("address")
        .and_then(serde_json::Value::as_str)
        .map(|address| vec![address.to_owned()])
        .unwrap_or_default()
}

fn parse_script_pubkey(spk: &serde_json::Value) -> Result<ScriptBuf, CoreError> {
    let hex_str = spk
        .get("hex")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CoreError::InvalidTxData("missing hex in scriptPubKey".into()))?;
    ScriptBuf::from_hex(hex_str)
        .map_err(|e| CoreError::InvalidTxData(format!("invalid scriptPubKey hex: {e}")))
}
