use std::num::{NonZeroU32, NonZeroUsize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bitcoin::hex::DisplayHex;
use bitcoin::{BlockHash, Txid};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use lru::LruCache;
use reqwest::{header, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};
use crate::types::RawTransaction;

use super::super::types::{ChainInfo, IndexInfo, VerboseBlock, WalletTransaction};
use super::super::NodeRpc;
use super::connection::{parse_endpoint, resolve_credentials, Credentials};
use super::parsing::{parse_hash_field, parse_raw_transaction};
use super::protocol::{decode_response, JsonRpcRequest};

/// Maximum number of verbose blocks kept in memory.
const BLOCK_CACHE_CAP: usize = 256;

// Bitcoin Core RPC error codes the client gives typed meaning to.
const RPC_INVALID_PARAMETER: i64 = -8;
const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;
const RPC_DESERIALIZATION_ERROR: i64 = -22;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Bitcoin Core JSON-RPC client over HTTP(S).
///
/// Keeps a bounded LRU of verbose blocks keyed by hash; a block's contents
/// never change for a given hash, so entries are only evicted, never
/// invalidated.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    credentials: Option<Credentials>,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
    block_cache: RwLock<LruCache<BlockHash, VerboseBlock>>,
}

impl HttpRpcClient {
    /// Create a new client for an HTTP(S) URL.
    ///
    /// Authentication precedence:
    /// 1. explicit `user` + `pass`
    /// 2. `user:pass@` embedded in `connection`
    /// 3. cookie file (`username:password`) from `cookie_file`
    /// 4. no auth
    ///
    /// If `requests_per_second` is set, every outbound request waits for
    /// the limiter first.
    pub fn new(
        connection: &str,
        user: Option<&str>,
        pass: Option<&str>,
        cookie_file: Option<&Path>,
        requests_per_second: Option<u32>,
    ) -> Result<Self, CoreError> {
        let endpoint = parse_endpoint(connection)?;
        let credentials = resolve_credentials(user, pass, endpoint.embedded, cookie_file)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(RpcError::Transport)?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url: endpoint.url.to_string(),
            credentials,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
            block_cache: RwLock::new(LruCache::new(
                NonZeroUsize::new(BLOCK_CACHE_CAP).expect("BLOCK_CACHE_CAP is non-zero"),
            )),
        })
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut builder = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some(creds) = &self.credentials {
            builder = builder.basic_auth(&creds.user, Some(&creds.pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        // Bitcoin Core answers auth failures with an empty body.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RpcError::InvalidResponse(format!("HTTP {status}")).into());
        }

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        decode_response(&body)
    }
}

#[async_trait]
impl NodeRpc for HttpRpcClient {
    async fn get_best_block_hash(&self) -> Result<BlockHash, CoreError> {
        let raw = self.rpc_call("getbestblockhash", Vec::new()).await?;
        parse_hash_field(Some(&raw), "getbestblockhash result")
    }

    async fn get_block_hash(&self, height: i64) -> Result<BlockHash, CoreError> {
        let raw = self
            .rpc_call("getblockhash", vec![serde_json::json!(height)])
            .await
            .map_err(|err| normalize_block_error(&height.to_string(), err))?;
        parse_hash_field(Some(&raw), "getblockhash result")
    }

    async fn get_verbose_block(&self, hash: &BlockHash) -> Result<VerboseBlock, CoreError> {
        // `LruCache::get` updates recency, so even lookups take the write lock.
        if let Some(block) = self.block_cache.write().await.get(hash).cloned() {
            return Ok(block);
        }

        let raw = self
            .rpc_call(
                "getblock",
                vec![serde_json::json!(hash.to_string()), serde_json::json!(1)],
            )
            .await
            .map_err(|err| normalize_block_error(&hash.to_string(), err))?;
        let block: VerboseBlock = serde_json::from_value(raw)
            .map_err(|e| CoreError::InvalidTxData(format!("invalid getblock result: {e}")))?;

        self.block_cache.write().await.put(*hash, block.clone());
        Ok(block)
    }

    async fn get_raw_transaction_verbose(
        &self,
        txid: &Txid,
    ) -> Result<RawTransaction, CoreError> {
        let raw = self
            .rpc_call(
                "getrawtransaction",
                vec![serde_json::json!(txid.to_string()), serde_json::json!(true)],
            )
            .await
            .map_err(|err| normalize_tx_error(txid, err))?;
        parse_raw_transaction(&raw)
    }

    async fn get_wallet_transaction(
        &self,
        txid: &Txid,
        include_watch_only: bool,
    ) -> Result<WalletTransaction, CoreError> {
        let raw = self
            .rpc_call(
                "gettransaction",
                vec![
                    serde_json::json!(txid.to_string()),
                    serde_json::json!(include_watch_only),
                ],
            )
            .await
            .map_err(|err| normalize_tx_error(txid, err))?;
        serde_json::from_value(raw)
            .map_err(|e| CoreError::InvalidTxData(format!("invalid gettransaction result: {e}")))
    }

    async fn decode_raw_transaction(&self, raw: &[u8]) -> Result<RawTransaction, CoreError> {
        let decoded = self
            .rpc_call(
                "decoderawtransaction",
                vec![serde_json::json!(raw.to_lower_hex_string())],
            )
            .await
            .map_err(normalize_decode_error)?;
        parse_raw_transaction(&decoded)
    }

    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        let raw = self.rpc_call("getblockchaininfo", Vec::new()).await?;
        serde_json::from_value(raw).map_err(|e| {
            CoreError::InvalidTxData(format!("invalid getblockchaininfo result: {e}"))
        })
    }

    async fn get_index_info(&self) -> Result<IndexInfo, CoreError> {
        let raw = self.rpc_call("getindexinfo", Vec::new()).await?;
        serde_json::from_value(raw)
            .map_err(|e| CoreError::InvalidTxData(format!("invalid getindexinfo result: {e}")))
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

// ==============================================================================
// RPC Error Normalization
// ==============================================================================

/// `getrawtransaction` and `gettransaction` answer -5 for unknown txids
/// ("No such mempool or blockchain transaction", "Invalid or non-wallet
/// transaction id").
fn normalize_tx_error(txid: &Txid, err: CoreError) -> CoreError {
    match err {
        CoreError::Rpc(RpcError::ServerError { code, .. }) if code == RPC_INVALID_ADDRESS_OR_KEY => {
            CoreError::TxNotFound(*txid)
        }
        other => other,
    }
}

/// `getblockhash` answers -8 past the tip; `getblock` answers -5 for
/// unknown hashes.
fn normalize_block_error(reference: &str, err: CoreError) -> CoreError {
    match err {
        CoreError::Rpc(RpcError::ServerError { code, .. })
            if code == RPC_INVALID_PARAMETER || code == RPC_INVALID_ADDRESS_OR_KEY =>
        {
            CoreError::BlockNotFound(reference.to_owned())
        }
        other => other,
    }
}

fn normalize_decode_error(err: CoreError) -> CoreError {
    match err {
        CoreError::Rpc(RpcError::ServerError { code, message })
            if code == RPC_DESERIALIZATION_ERROR =>
        {
            CoreError::MalformedTransaction(message)
        }
        other => other,
    }
}
