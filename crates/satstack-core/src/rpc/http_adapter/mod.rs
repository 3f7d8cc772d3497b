//! Native JSON-RPC client for Bitcoin Core compatible endpoints.
//!
//! Implements [`NodeRpc`] over JSON-RPC using `reqwest`, with support for
//! HTTP transport, optional request rate limiting, basic or cookie auth,
//! typed not-found errors, and an LRU cache of verbose blocks.
//!
//! [`NodeRpc`]: super::NodeRpc

mod client;
mod connection;
mod parsing;
mod protocol;

pub use client::HttpRpcClient;
