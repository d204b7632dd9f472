//! Shared fund endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engine::{AllocateCmd, FondsPartage, MouvementFonds, MovementCmd, MovementKind};

use crate::{ServerError, server::ServerState, user};

#[derive(Debug, Deserialize)]
pub struct FondsNew {
    pub transaction_source_id: String,
    pub source_compte_id: Uuid,
    pub primary_compte_id: Option<Uuid>,
    pub montant: i64,
    pub libelle: String,
    pub description: Option<String>,
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FondsNew>,
) -> Result<Json<FondsPartage>, ServerError> {
    let mut cmd = AllocateCmd::new(
        user.username,
        payload.transaction_source_id,
        payload.source_compte_id,
        payload.montant,
        payload.libelle,
    );
    if let Some(primary_id) = payload.primary_compte_id {
        cmd = cmd.primary_compte_id(primary_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let fonds = state.engine.allocate(cmd).await?;
    Ok(Json(fonds))
}

#[derive(Debug, Deserialize)]
pub struct FondsListQuery {
    pub compte_id: Uuid,
}

/// Funds the given account can still draw from, newest first.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<FondsListQuery>,
) -> Result<Json<Vec<FondsPartage>>, ServerError> {
    let fonds = state
        .engine
        .list_available_fonds(query.compte_id, &user.username)
        .await?;
    Ok(Json(fonds))
}

#[derive(Debug, Deserialize)]
pub struct MouvementNew {
    pub compte_id: Uuid,
    pub kind: MovementKind,
    pub montant: i64,
    pub transaction_id: Option<String>,
    pub libelle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MouvementCreated {
    pub id: Uuid,
}

pub async fn apply_movement(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MouvementNew>,
) -> Result<Json<MouvementCreated>, ServerError> {
    let mut cmd = MovementCmd::new(
        user.username,
        id,
        payload.compte_id,
        payload.kind,
        payload.montant,
    );
    if let Some(transaction_id) = payload.transaction_id {
        cmd = cmd.transaction_id(transaction_id);
    }
    if let Some(libelle) = payload.libelle {
        cmd = cmd.libelle(libelle);
    }
    let mouvement_id = state.engine.apply_movement(cmd).await?;
    Ok(Json(MouvementCreated { id: mouvement_id }))
}

pub async fn list_movements(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MouvementFonds>>, ServerError> {
    let mouvements = state.engine.list_movements(id, &user.username).await?;
    Ok(Json(mouvements))
}

#[derive(Debug, Serialize)]
pub struct RecomputeResult {
    pub montant_restant: i64,
}

/// Replays the movement log and repairs the materialised restant.
pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecomputeResult>, ServerError> {
    let montant_restant = state.engine.recompute_fonds(id, &user.username).await?;
    Ok(Json(RecomputeResult { montant_restant }))
}
