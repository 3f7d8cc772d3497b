use std::path::PathBuf;

use clap::Parser;

/// satstack: explorer-style JSON API over a Bitcoin Core node, with or
/// without a transaction index.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Bitcoin Core RPC URL. May embed `user:pass@`.
    #[arg(long, default_value = "http://127.0.0.1:8332", env = "SATSTACK_RPC_URL")]
    pub rpc_url: String,

    /// RPC username. Requires `--rpc-pass`.
    #[arg(long, env = "SATSTACK_RPC_USER", requires = "rpc_pass")]
    pub rpc_user: Option<String>,

    /// RPC password. Requires `--rpc-user`.
    #[arg(long, env = "SATSTACK_RPC_PASS", requires = "rpc_user", hide_env_values = true)]
    pub rpc_pass: Option<String>,

    /// Bitcoin Core cookie file, used when no other credentials are given.
    #[arg(long, env = "SATSTACK_RPC_COOKIE_FILE")]
    pub rpc_cookie_file: Option<PathBuf>,

    /// Upper bound on outbound RPC requests per second.
    #[arg(long, env = "SATSTACK_RPC_REQUESTS_PER_SECOND")]
    pub rpc_requests_per_second: Option<u32>,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1", env = "SATSTACK_BIND")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "3090", env = "SATSTACK_PORT")]
    pub port: u16,

    /// Force the transaction lookup strategy instead of asking the node
    /// (`getindexinfo`) whether `-txindex` is enabled.
    #[arg(long, env = "SATSTACK_TXINDEX")]
    pub txindex: Option<bool>,

    /// Browser origin allowed to call the API. CORS is off when unset.
    #[arg(long, env = "SATSTACK_CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}
