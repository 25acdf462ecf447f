//! Admin endpoints
//!
//! Authorization is enforced by the engine: every call passes the caller's
//! [`Actor`] and non-admins get 403.

use api_types::{
    composition::{SlotToggle, TeamCompositionList, TeamCompositionView},
    purchase::{
        BatchActionRequest, BatchActionResponse, PurchaseAction, PurchaseList, PurchaseQuery,
        PurchaseView, ReturnView,
    },
    team::TeamList,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{Actor, ApprovalItem, PurchaseFilter};

use crate::{ServerError, server::ServerState, views};

pub async fn purchases(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<PurchaseQuery>,
) -> Result<Json<PurchaseList>, ServerError> {
    let filter = PurchaseFilter {
        status: query.status.map(views::engine_purchase_status),
        team_id: query.team_id,
        needs_return: query.needs_return,
    };
    let purchases = state.engine.purchases(&actor, filter).await?;

    Ok(Json(PurchaseList {
        purchases: purchases.into_iter().map(views::purchase).collect(),
    }))
}

/// Handle a confirm or cancel on one pending purchase
pub async fn purchase_action(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(purchase_id): Path<i64>,
    Json(payload): Json<PurchaseAction>,
) -> Result<Json<PurchaseView>, ServerError> {
    let purchase = state
        .engine
        .update_purchase_status(&actor, purchase_id, views::approval_action(payload.action))
        .await?;

    Ok(Json(views::purchase(purchase)))
}

/// Handle a batch of approvals; failed items are reported, not raised
pub async fn batch_action(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<BatchActionRequest>,
) -> Result<Json<BatchActionResponse>, ServerError> {
    let items: Vec<ApprovalItem> = payload
        .items
        .iter()
        .map(|item| ApprovalItem {
            purchase_id: item.purchase_id,
            action: views::approval_action(item.action),
            approved_quantity: item.approved_quantity,
        })
        .collect();
    let report = state.engine.batch_action(&actor, &items).await?;

    Ok(Json(views::batch_report(report)))
}

pub async fn mark_returned(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(purchase_id): Path<i64>,
) -> Result<Json<ReturnView>, ServerError> {
    let outcome = state.engine.mark_as_returned(&actor, purchase_id).await?;

    Ok(Json(views::return_outcome(outcome)))
}

pub async fn unmark_returned(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(purchase_id): Path<i64>,
) -> Result<Json<ReturnView>, ServerError> {
    let outcome = state.engine.unmark_as_returned(&actor, purchase_id).await?;

    Ok(Json(views::return_outcome(outcome)))
}

pub async fn teams(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<TeamList>, ServerError> {
    let teams = state.engine.teams(&actor).await?;

    Ok(Json(TeamList {
        teams: teams.into_iter().map(views::team).collect(),
    }))
}

pub async fn team_compositions(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<TeamCompositionList>, ServerError> {
    let compositions = state.engine.team_compositions(&actor).await?;

    Ok(Json(TeamCompositionList {
        compositions: compositions.into_iter().map(views::composition).collect(),
    }))
}

pub async fn toggle_slot(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(composition_id): Path<i64>,
    Json(payload): Json<SlotToggle>,
) -> Result<Json<TeamCompositionView>, ServerError> {
    let composition = state
        .engine
        .toggle_team_slot(
            &actor,
            composition_id,
            views::department(payload.department),
            views::slot_action(payload.action),
        )
        .await?;

    Ok(Json(views::composition(composition)))
}
