use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod team {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamView {
        pub id: i64,
        pub name: String,
        pub email: String,
        pub credit: i64,
        pub last_activity: DateTime<Utc>,
    }

    /// Request body for `PUT /api/team/profile`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailUpdate {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamList {
        pub teams: Vec<TeamView>,
    }
}

pub mod resource {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResourceView {
        pub id: i64,
        pub name: String,
        pub description: String,
        pub cost: i64,
        /// Remaining stock.
        pub quantity: i64,
        pub max_per_team: i64,
        #[serde(rename = "type")]
        pub kind: String,
        pub image_url: Option<String>,
        pub is_active: bool,
        pub is_non_returnable: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ResourceQuery {
        #[serde(rename = "type")]
        pub kind: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResourceList {
        pub resources: Vec<ResourceView>,
    }
}

pub mod purchase {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PurchaseStatus {
        Pending,
        Confirmed,
        Cancelled,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ApprovalAction {
        Confirm,
        Cancel,
    }

    /// Request body for `POST /api/team/purchases`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub resource_id: i64,
        pub quantity: i64,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct PurchaseLine {
        pub resource_id: i64,
        pub quantity: i64,
    }

    /// Request body for `POST /api/team/purchases/batch`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BatchPurchaseNew {
        pub items: Vec<PurchaseLine>,
        #[serde(default)]
        pub comment: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseView {
        pub id: i64,
        pub batch_id: Option<String>,
        pub team_id: i64,
        pub resource_id: i64,
        pub quantity: i64,
        pub requested_quantity: i64,
        pub comment: String,
        pub purchase_date: DateTime<Utc>,
        pub status: PurchaseStatus,
        pub is_returned: bool,
        pub needs_return: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseList {
        pub purchases: Vec<PurchaseView>,
    }

    /// Query of `GET /api/team/purchases`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TeamPurchaseQuery {
        #[serde(default)]
        pub needs_return: bool,
    }

    /// Query of `GET /api/admin/purchases`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PurchaseQuery {
        pub status: Option<PurchaseStatus>,
        pub team_id: Option<i64>,
        pub needs_return: Option<bool>,
    }

    /// Request body for `POST /api/admin/purchases/{id}/action`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseAction {
        pub action: ApprovalAction,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct BatchActionItem {
        pub purchase_id: i64,
        pub action: ApprovalAction,
        pub approved_quantity: Option<i64>,
    }

    /// Request body for `POST /api/admin/purchases/batch/action`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BatchActionRequest {
        pub items: Vec<BatchActionItem>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BatchActionResult {
        pub purchase_id: i64,
        pub success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<PurchaseStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub quantity: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BatchActionResponse {
        pub total: usize,
        pub success_count: usize,
        pub failure_count: usize,
        pub results: Vec<BatchActionResult>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnView {
        pub purchase: PurchaseView,
        pub stock_delta: i64,
    }
}

pub mod poll {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PollStatus {
        Open,
        Closed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PollView {
        pub id: i64,
        pub question: String,
        pub options: Vec<String>,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub status: PollStatus,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PollQuery {
        pub status: Option<PollStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PollList {
        pub polls: Vec<PollView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PollDetail {
        pub poll: PollView,
        pub votes: Vec<VoteView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OptionTallyView {
        pub option: String,
        pub count: i64,
        pub total_credits: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PollResultsView {
        pub poll_id: i64,
        pub question: String,
        pub status: PollStatus,
        pub total_votes: i64,
        pub total_credits: i64,
        pub options: Vec<OptionTallyView>,
    }

    /// Request body for `POST /api/team/votes`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoteNew {
        pub poll_id: i64,
        pub option: String,
        pub credit_staked: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoteView {
        pub id: i64,
        pub team_id: i64,
        pub poll_id: i64,
        pub chosen_option: String,
        pub credit_staked: i64,
        pub vote_date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoteList {
        pub votes: Vec<VoteView>,
    }
}

pub mod composition {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Department {
        Dev,
        Infra,
        Data,
        Iot,
        Sysemb,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SlotAction {
        Fill,
        Empty,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SlotView {
        pub total: i32,
        pub filled: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamCompositionView {
        pub id: i64,
        pub name: String,
        pub dev: SlotView,
        pub infra: SlotView,
        pub data: SlotView,
        pub iot: SlotView,
        pub sysemb: SlotView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamCompositionList {
        pub compositions: Vec<TeamCompositionView>,
    }

    /// Request body for `POST /api/admin/team-compositions/{id}/toggle`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotToggle {
        pub department: Department,
        pub action: SlotAction,
    }
}
