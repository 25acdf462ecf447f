//! Team purchase endpoints

use api_types::purchase::{
    BatchPurchaseNew, PurchaseList, PurchaseNew, PurchaseView, ReturnView, TeamPurchaseQuery,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Actor, PurchaseItem};

use crate::{ServerError, server::ServerState, views};

/// Handle requests for a single purchase
pub async fn purchase_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseNew>,
) -> Result<(StatusCode, Json<PurchaseView>), ServerError> {
    let team_id = actor.require_team()?;
    let purchase = state
        .engine
        .create_purchase(team_id, payload.resource_id, payload.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(views::purchase(purchase))))
}

/// Handle requests for an all-or-nothing batch purchase
pub async fn batch_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<BatchPurchaseNew>,
) -> Result<(StatusCode, Json<PurchaseList>), ServerError> {
    let team_id = actor.require_team()?;
    let items: Vec<PurchaseItem> = payload
        .items
        .iter()
        .map(|line| PurchaseItem {
            resource_id: line.resource_id,
            quantity: line.quantity,
        })
        .collect();
    let purchases = state
        .engine
        .create_batch_purchase(team_id, &items, &payload.comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseList {
            purchases: purchases.into_iter().map(views::purchase).collect(),
        }),
    ))
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<TeamPurchaseQuery>,
) -> Result<Json<PurchaseList>, ServerError> {
    let team_id = actor.require_team()?;
    let purchases = state
        .engine
        .team_purchases(team_id, query.needs_return)
        .await?;

    Ok(Json(PurchaseList {
        purchases: purchases.into_iter().map(views::purchase).collect(),
    }))
}

/// Handle a team giving back a confirmed purchase
pub async fn return_purchase(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(purchase_id): Path<i64>,
) -> Result<Json<ReturnView>, ServerError> {
    let team_id = actor.require_team()?;
    let outcome = state.engine.return_purchase(team_id, purchase_id).await?;

    Ok(Json(views::return_outcome(outcome)))
}
