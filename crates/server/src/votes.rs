//! Team voting endpoints

use api_types::poll::{VoteList, VoteNew, VoteView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Actor;

use crate::{ServerError, server::ServerState, views};

/// Handle requests for staking credit on a poll option
pub async fn vote_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<VoteNew>,
) -> Result<(StatusCode, Json<VoteView>), ServerError> {
    let team_id = actor.require_team()?;
    let vote = state
        .engine
        .cast_vote(team_id, payload.poll_id, &payload.option, payload.credit_staked)
        .await?;

    Ok((StatusCode::CREATED, Json(views::vote(vote))))
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<VoteList>, ServerError> {
    let team_id = actor.require_team()?;
    let votes = state.engine.team_votes(team_id).await?;

    Ok(Json(VoteList {
        votes: votes.into_iter().map(views::vote).collect(),
    }))
}

pub async fn for_poll(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(poll_id): Path<i64>,
) -> Result<Json<VoteView>, ServerError> {
    let team_id = actor.require_team()?;
    let vote = state.engine.vote_for_poll(team_id, poll_id).await?;

    Ok(Json(views::vote(vote)))
}
