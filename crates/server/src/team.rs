//! Team profile endpoints

use api_types::team::{EmailUpdate, TeamView};
use axum::{Extension, Json, extract::State};
use engine::Actor;

use crate::{ServerError, server::ServerState, views};

pub async fn profile(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<TeamView>, ServerError> {
    let team_id = actor.require_team()?;
    let team = state.engine.team_profile(team_id).await?;

    Ok(Json(views::team(team)))
}

/// Handle requests for changing the team contact email
pub async fn update_profile(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<EmailUpdate>,
) -> Result<Json<TeamView>, ServerError> {
    let team_id = actor.require_team()?;
    let team = state
        .engine
        .update_team_email(team_id, &payload.email)
        .await?;

    Ok(Json(views::team(team)))
}
