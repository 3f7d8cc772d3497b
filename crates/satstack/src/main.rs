mod cli;
mod server;

use std::sync::Arc;

use axum::http::HeaderValue;
use clap::Parser;
use eyre::{eyre, WrapErr};

use satstack_core::rpc::{HttpRpcClient, NodeRpc};
use satstack_core::config::detect_tx_index;
use satstack_core::NodeConfig;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let cors_origin = args
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .wrap_err("invalid --cors-origin")?;

    let rpc: Arc<dyn NodeRpc> = Arc::new(
        HttpRpcClient::new(
            &args.rpc_url,
            args.rpc_user.as_deref(),
            args.rpc_pass.as_deref(),
            args.rpc_cookie_file.as_deref(),
            args.rpc_requests_per_second,
        )
        .wrap_err("configure Bitcoin Core RPC client")?,
    );

    // Fail fast if the node is unreachable rather than on the first request.
    let chain_info = rpc.get_blockchain_info().await.map_err(|err| {
        let message = format_rpc_connect_error(&args.rpc_url, &err.to_string());
        eyre!(message).wrap_err("while attempting to connect to Bitcoin Core RPC")
    })?;

    tracing::info!(
        chain = %chain_info.chain,
        blocks = chain_info.blocks,
        "connected to Bitcoin Core"
    );
    if chain_info.pruned {
        tracing::warn!("node is pruned; blocks and transactions below the prune height cannot be served");
    }

    let tx_index = match args.txindex {
        Some(forced) => {
            tracing::info!(txindex = forced, "transaction lookup strategy set on the command line");
            forced
        }
        None => detect_tx_index(rpc.as_ref()).await,
    };

    let config = NodeConfig::from_chain_info(&chain_info, tx_index)
        .wrap_err("derive node configuration from getblockchaininfo")?;
    tracing::info!(
        currency = %config.currency,
        txindex = config.tx_index,
        "node configuration ready"
    );
    if !config.tx_index {
        tracing::warn!(
            "txindex unavailable; only transactions known to the node's wallet can be resolved"
        );
    }

    let state = server::AppState { rpc, config };
    let router = server::build_router(state, cors_origin);

    let bind_addr = format!("{}:{}", args.bind, args.port);
    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0; it is accessible from the network");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .wrap_err("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("run HTTP server")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not connect to RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("Could not resolve host") || source_error.contains("dns error") {
        lines.push("hint: hostname resolution failed; verify the RPC host".into());
    } else if source_error.contains("Connection refused") {
        lines.push(
            "hint: nothing is listening there; check that bitcoind is running with -server and the right -rpcport"
                .into(),
        );
    } else if source_error.contains("401") || source_error.contains("403") {
        lines.push(
            "hint: authentication failed; verify --rpc-user/--rpc-pass or --rpc-cookie-file"
                .into(),
        );
    } else if source_error.contains("certificate") || source_error.contains("tls") {
        lines.push("hint: TLS handshake failed; verify the endpoint really serves HTTPS".into());
    }

    lines.join("\n")
}
