use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use std::{net::SocketAddr, sync::Arc};

use crate::{admin, catalog, identity, purchases, team, votes};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every `/api` route requires the identity headers; `/health` does not.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/api/team/purchases",
            post(purchases::purchase_new).get(purchases::list),
        )
        .route("/api/team/purchases/batch", post(purchases::batch_new))
        .route(
            "/api/team/purchases/{id}/return",
            post(purchases::return_purchase),
        )
        .route(
            "/api/team/profile",
            get(team::profile).put(team::update_profile),
        )
        .route("/api/team/votes", post(votes::vote_new).get(votes::list))
        .route("/api/team/votes/poll/{poll_id}", get(votes::for_poll))
        .route("/api/resources", get(catalog::resources))
        .route("/api/resources/{id}", get(catalog::resource))
        .route("/api/polls", get(catalog::polls))
        .route("/api/polls/{id}", get(catalog::poll))
        .route("/api/polls/{id}/results", get(catalog::poll_results))
        .route("/api/admin/purchases", get(admin::purchases))
        .route(
            "/api/admin/purchases/batch/action",
            post(admin::batch_action),
        )
        .route(
            "/api/admin/purchases/{id}/action",
            post(admin::purchase_action),
        )
        .route(
            "/api/admin/purchases/{id}/mark-returned",
            post(admin::mark_returned),
        )
        .route(
            "/api/admin/purchases/{id}/unmark-returned",
            post(admin::unmark_returned),
        )
        .route("/api/admin/teams", get(admin::teams))
        .route("/api/admin/team-compositions", get(admin::team_compositions))
        .route(
            "/api/admin/team-compositions/{id}/toggle",
            post(admin::toggle_slot),
        )
        .route_layer(middleware::from_fn(identity::identify))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
