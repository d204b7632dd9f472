use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use sea_orm::{DatabaseConnection, EntityTrait};

use std::sync::Arc;

use crate::{comptes, fonds, recettes, transferts, user};
use engine::Engine;

/// Identity forwarded by the upstream authenticating proxy.
static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the forwarded `x-user-id` header to its users row and injects
/// it as a request extension. Requests without a resolvable identity are
/// rejected; authentication itself happens upstream.
async fn identity(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(value) = request.headers().get(&USER_ID_HEADER) else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let Ok(username) = value.to_str() else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user: Option<user::Model> = user::Entity::find_by_id(username.to_string())
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/comptes", post(comptes::create))
        .route("/comptes/{id}/exclusion", put(comptes::set_exclusion))
        .route("/recettes", post(recettes::create))
        .route("/recettes/totaux", get(recettes::totaux))
        .route(
            "/recettes/{id}",
            get(recettes::get).delete(recettes::delete),
        )
        .route("/recettes/{id}/debit", post(recettes::debit))
        .route("/recettes/{id}/validation", put(recettes::set_validation))
        .route("/transferts", post(transferts::create))
        .route("/transferts/{id}", delete(transferts::reverse))
        .route("/fonds", post(fonds::create).get(fonds::list))
        .route(
            "/fonds/{id}/mouvements",
            post(fonds::apply_movement).get(fonds::list_movements),
        )
        .route("/fonds/{id}/recompute", post(fonds::recompute))
        .route_layer(middleware::from_fn_with_state(state.clone(), identity))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, created_at) VALUES (?, ?)",
            vec!["alice".into(), chrono::Utc::now().into()],
        ))
        .await
        .unwrap();

        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "alice")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let router = test_router().await;
        let response = router
            .oneshot(
                http::Request::builder()
                    .method("GET")
                    .uri("/recettes/totaux")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_identity_is_unauthorized() {
        let router = test_router().await;
        let response = router
            .oneshot(
                http::Request::builder()
                    .method("GET")
                    .uri("/recettes/totaux")
                    .header("x-user-id", "mallory")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_recette_and_report_totals() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/recettes",
                serde_json::json!({"libelle": "Salaire", "montant": 500_000}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let recette: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(recette["solde_disponible"], 500_000);

        let response = router
            .oneshot(
                http::Request::builder()
                    .method("GET")
                    .uri("/recettes/totaux")
                    .header("x-user-id", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let totaux: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(totaux["disponible"], 500_000);
        assert_eq!(totaux["certifie"], 0);
    }

    #[tokio::test]
    async fn insufficient_transfer_maps_to_422() {
        let router = test_router().await;

        let source = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/recettes",
                serde_json::json!({"libelle": "Salaire", "montant": 40_000}),
            ))
            .await
            .unwrap();
        let source: serde_json::Value = serde_json::from_slice(
            &source.into_body().collect().await.unwrap().to_bytes(),
        )
        .unwrap();

        let destination = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/recettes",
                serde_json::json!({"libelle": "Reserve", "montant": 0}),
            ))
            .await
            .unwrap();
        let destination: serde_json::Value = serde_json::from_slice(
            &destination.into_body().collect().await.unwrap().to_bytes(),
        )
        .unwrap();

        let response = router
            .oneshot(json_request(
                "POST",
                "/transferts",
                serde_json::json!({
                    "recette_source_id": source["id"],
                    "recette_destination_id": destination["id"],
                    "montant": 50_000
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
