use bitcoin::Txid;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("malformed hash `{input}`: {reason}")]
    MalformedHash { input: String, reason: String },

    #[error("invalid block '{0}'")]
    InvalidBlockReference(String),

    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("transaction not found: {0}")]
    TxNotFound(Txid),

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("cannot convert amount `{value}` to satoshis: {reason}")]
    AmountParse { value: String, reason: String },

    #[error("invalid transaction data: {0}")]
    InvalidTxData(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Failures of the node client itself, passed through unchanged by the
/// resolvers.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC server error {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
}

