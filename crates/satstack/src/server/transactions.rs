use axum::extract::{Path, State};
use axum::Json;

use satstack_core::types::TransactionView;
use satstack_core::TransactionResolver;

use super::error::AppError;
use super::SharedState;

/// The transaction plus the outputs its inputs spend. Inputs whose funding
/// transaction the node cannot see are left out of `utxos`.
pub(super) async fn get_transaction(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> Result<Json<TransactionView>, AppError> {
    let resolver = TransactionResolver::new(state.rpc.as_ref(), &state.config);
    let view = resolver.resolve_transaction_view(&hash).await?;
    tracing::debug!(
        txid = %view.transaction.txid,
        lookup = ?resolver.lookup(),
        utxos = view.utxos.len(),
        "served transaction"
    );
    Ok(Json(view))
}
