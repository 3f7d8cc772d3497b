//! Block lookup by loosely-typed reference.

use bitcoin::BlockHash;
use tracing::debug;

use crate::error::CoreError;
use crate::reference::parse_block_reference;
use crate::rpc::NodeRpc;
use crate::types::{Block, BlockReference};

/// Resolve `reference` (`current`, a hash, or a height) to a block hash on
/// the node's best chain.
pub async fn resolve_block_hash(
    rpc: &dyn NodeRpc,
    reference: &str,
) -> Result<BlockHash, CoreError> {
    let reference = parse_block_reference(reference)?;
    debug!(%reference, "resolving block hash");
    match reference {
        BlockReference::Current => rpc.get_best_block_hash().await,
        BlockReference::Hash(hash) => Ok(hash),
        BlockReference::Height(height) => rpc.get_block_hash(height).await,
    }
}

/// Resolve `reference` and fetch the block it names.
pub async fn resolve_block(rpc: &dyn NodeRpc, reference: &str) -> Result<Block, CoreError> {
    let hash = resolve_block_hash(rpc, reference).await?;
    let block = rpc.get_verbose_block(&hash).await?;
    Ok(Block::from(block))
}
