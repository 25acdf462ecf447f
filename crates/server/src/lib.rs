use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod admin;
mod catalog;
mod identity;
mod purchases;
mod server;
mod team;
mod views;
mod votes;

pub mod types {
    pub mod team {
        pub use api_types::team::{EmailUpdate, TeamList, TeamView};
    }

    pub mod resource {
        pub use api_types::resource::{ResourceList, ResourceQuery, ResourceView};
    }

    pub mod purchase {
        pub use api_types::purchase::{
            ApprovalAction, BatchActionItem, BatchActionRequest, BatchActionResponse,
            BatchActionResult, BatchPurchaseNew, PurchaseAction, PurchaseLine, PurchaseList,
            PurchaseNew, PurchaseQuery, PurchaseStatus, PurchaseView, ReturnView,
            TeamPurchaseQuery,
        };
    }

    pub mod poll {
        pub use api_types::poll::{
            OptionTallyView, PollDetail, PollList, PollQuery, PollResultsView, PollStatus,
            PollView, VoteList, VoteNew, VoteView,
        };
    }

    pub mod composition {
        pub use api_types::composition::{
            Department, SlotAction, SlotToggle, SlotView, TeamCompositionList,
            TeamCompositionView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::AlreadyExists(_)
        | EngineError::AlreadyVoted(_)
        | EngineError::AlreadyProcessed(_)
        | EngineError::AlreadyReturned(_)
        | EngineError::NotReturned(_) => StatusCode::CONFLICT,
        EngineError::BadRequest(_) => StatusCode::BAD_REQUEST,
        EngineError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::TransactionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::ResourceUnavailable(_)
        | EngineError::PollClosed(_)
        | EngineError::PollInactive(_)
        | EngineError::InsufficientStock(_)
        | EngineError::InsufficientCredit(_)
        | EngineError::QuotaExceeded(_)
        | EngineError::InvalidOption(_)
        | EngineError::InvalidApprovedQuantity(_)
        | EngineError::NonReturnable(_)
        | EngineError::NotConfirmed(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::TransactionFailed(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
