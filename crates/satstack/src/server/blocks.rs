use axum::extract::{Path, State};
use axum::Json;

use satstack_core::types::Block;

use super::error::AppError;
use super::SharedState;

pub(super) async fn get_block(
    State(state): State<SharedState>,
    Path(reference): Path<String>,
) -> Result<Json<Block>, AppError> {
    let block = satstack_core::resolve_block(state.rpc.as_ref(), &reference).await?;
    Ok(Json(block))
}
