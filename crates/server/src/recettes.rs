//! Income pool endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use engine::{NewRecetteCmd, Recette, Totaux};

use crate::{ServerError, server::ServerState, user};

#[derive(Debug, Deserialize)]
pub struct RecetteNew {
    pub libelle: String,
    pub montant: i64,
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecetteNew>,
) -> Result<Json<Recette>, ServerError> {
    let recette = state
        .engine
        .new_recette(NewRecetteCmd::new(
            user.username,
            payload.libelle,
            payload.montant,
        ))
        .await?;
    Ok(Json(recette))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Recette>, ServerError> {
    let recette = state.engine.recette(id, &user.username).await?;
    Ok(Json(recette))
}

#[derive(Debug, Deserialize)]
pub struct RecetteDebit {
    pub montant: i64,
}

/// Direct spend-down of a pool, invoked by expense recording.
pub async fn debit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecetteDebit>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .debit_recette(id, &user.username, payload.montant)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_recette(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ValidationSet {
    pub certified: bool,
}

pub async fn set_validation(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValidationSet>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_certified(id, &user.username, payload.certified)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn totaux(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Totaux>, ServerError> {
    let totaux = state.engine.totaux(&user.username).await?;
    Ok(Json(totaux))
}
