//! Read-only catalog endpoints shared by teams and admins

use api_types::{
    poll::{PollDetail, PollList, PollQuery, PollResultsView},
    resource::{ResourceList, ResourceQuery, ResourceView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{ServerError, server::ServerState, views};

pub async fn resources(
    State(state): State<ServerState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<ResourceList>, ServerError> {
    let resources = state.engine.resources(query.kind.as_deref()).await?;

    Ok(Json(ResourceList {
        resources: resources.into_iter().map(views::resource).collect(),
    }))
}

pub async fn resource(
    State(state): State<ServerState>,
    Path(resource_id): Path<i64>,
) -> Result<Json<ResourceView>, ServerError> {
    let resource = state.engine.resource(resource_id).await?;

    Ok(Json(views::resource(resource)))
}

pub async fn polls(
    State(state): State<ServerState>,
    Query(query): Query<PollQuery>,
) -> Result<Json<PollList>, ServerError> {
    let polls = state
        .engine
        .polls(query.status.map(views::engine_poll_status))
        .await?;

    Ok(Json(PollList {
        polls: polls.into_iter().map(views::poll).collect(),
    }))
}

/// Poll with every vote cast on it
pub async fn poll(
    State(state): State<ServerState>,
    Path(poll_id): Path<i64>,
) -> Result<Json<PollDetail>, ServerError> {
    let (poll, votes) = state.engine.poll(poll_id).await?;

    Ok(Json(PollDetail {
        poll: views::poll(poll),
        votes: votes.into_iter().map(views::vote).collect(),
    }))
}

pub async fn poll_results(
    State(state): State<ServerState>,
    Path(poll_id): Path<i64>,
) -> Result<Json<PollResultsView>, ServerError> {
    let results = state.engine.poll_results(poll_id).await?;

    Ok(Json(views::poll_results(results)))
}
