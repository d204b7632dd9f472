//! Bank account endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use engine::{Compte, NewCompteCmd};

use crate::{ServerError, server::ServerState, user};

#[derive(Debug, Deserialize)]
pub struct CompteNew {
    pub libelle: String,
    pub solde: i64,
    #[serde(default)]
    pub exclude_from_total: bool,
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CompteNew>,
) -> Result<Json<Compte>, ServerError> {
    let compte = state
        .engine
        .new_compte(
            NewCompteCmd::new(user.username, payload.libelle, payload.solde)
                .exclude_from_total(payload.exclude_from_total),
        )
        .await?;
    Ok(Json(compte))
}

#[derive(Debug, Deserialize)]
pub struct ExclusionSet {
    pub excluded: bool,
}

pub async fn set_exclusion(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExclusionSet>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_compte_exclusion(id, &user.username, payload.excluded)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
