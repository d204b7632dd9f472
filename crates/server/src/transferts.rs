//! Transfer endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use engine::{Transfert, TransferCmd};

use crate::{ServerError, server::ServerState, user};

#[derive(Debug, Deserialize)]
pub struct TransfertNew {
    pub recette_source_id: Uuid,
    pub recette_destination_id: Uuid,
    pub montant: i64,
    pub description: Option<String>,
    /// Effective date; defaults to now.
    pub date_transfert: Option<DateTime<Utc>>,
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransfertNew>,
) -> Result<Json<Transfert>, ServerError> {
    let mut cmd = TransferCmd::new(
        user.username,
        payload.recette_source_id,
        payload.recette_destination_id,
        payload.montant,
        payload.date_transfert.unwrap_or_else(Utc::now),
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let transfert = state.engine.transfer(cmd).await?;
    Ok(Json(transfert))
}

/// Deleting a transfert reverses it: balances are restored and the row is
/// removed.
pub async fn reverse(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.reverse_transfer(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
