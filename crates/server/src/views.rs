//! Conversions from engine values to their wire representation.

use api_types::{
    composition::{Department, SlotAction, SlotView, TeamCompositionView},
    poll::{OptionTallyView, PollResultsView, PollStatus, PollView, VoteView},
    purchase::{
        ApprovalAction, BatchActionResponse, BatchActionResult, PurchaseStatus, PurchaseView,
        ReturnView,
    },
    resource::ResourceView,
    team::TeamView,
};

pub fn team(team: engine::Team) -> TeamView {
    TeamView {
        id: team.id,
        name: team.name,
        email: team.email,
        credit: team.credit,
        last_activity: team.last_activity,
    }
}

pub fn resource(resource: engine::Resource) -> ResourceView {
    ResourceView {
        id: resource.id,
        name: resource.name,
        description: resource.description,
        cost: resource.cost,
        quantity: resource.quantity,
        max_per_team: resource.max_per_team,
        kind: resource.kind,
        image_url: resource.image_url,
        is_active: resource.is_active,
        is_non_returnable: resource.is_non_returnable,
    }
}

pub fn purchase_status(status: engine::PurchaseStatus) -> PurchaseStatus {
    match status {
        engine::PurchaseStatus::Pending => PurchaseStatus::Pending,
        engine::PurchaseStatus::Confirmed => PurchaseStatus::Confirmed,
        engine::PurchaseStatus::Cancelled => PurchaseStatus::Cancelled,
    }
}

pub fn engine_purchase_status(status: PurchaseStatus) -> engine::PurchaseStatus {
    match status {
        PurchaseStatus::Pending => engine::PurchaseStatus::Pending,
        PurchaseStatus::Confirmed => engine::PurchaseStatus::Confirmed,
        PurchaseStatus::Cancelled => engine::PurchaseStatus::Cancelled,
    }
}

pub fn approval_action(action: ApprovalAction) -> engine::ApprovalAction {
    match action {
        ApprovalAction::Confirm => engine::ApprovalAction::Confirm,
        ApprovalAction::Cancel => engine::ApprovalAction::Cancel,
    }
}

pub fn purchase(purchase: engine::Purchase) -> PurchaseView {
    PurchaseView {
        id: purchase.id,
        batch_id: purchase.batch_id,
        team_id: purchase.team_id,
        resource_id: purchase.resource_id,
        quantity: purchase.quantity,
        requested_quantity: purchase.requested_quantity,
        comment: purchase.comment,
        purchase_date: purchase.purchase_date,
        status: purchase_status(purchase.status),
        is_returned: purchase.is_returned,
        needs_return: purchase.needs_return,
    }
}

pub fn return_outcome(outcome: engine::ReturnOutcome) -> ReturnView {
    ReturnView {
        purchase: purchase(outcome.purchase),
        stock_delta: outcome.stock_delta,
    }
}

pub fn batch_report(report: engine::BatchApprovalReport) -> BatchActionResponse {
    BatchActionResponse {
        total: report.total,
        success_count: report.success_count,
        failure_count: report.failure_count,
        results: report
            .results
            .into_iter()
            .map(|outcome| BatchActionResult {
                purchase_id: outcome.purchase_id,
                success: outcome.success,
                error: outcome.error,
                status: outcome.status.map(purchase_status),
                quantity: outcome.quantity,
            })
            .collect(),
    }
}

pub fn poll_status(status: engine::PollStatus) -> PollStatus {
    match status {
        engine::PollStatus::Open => PollStatus::Open,
        engine::PollStatus::Closed => PollStatus::Closed,
    }
}

pub fn engine_poll_status(status: PollStatus) -> engine::PollStatus {
    match status {
        PollStatus::Open => engine::PollStatus::Open,
        PollStatus::Closed => engine::PollStatus::Closed,
    }
}

pub fn poll(poll: engine::Poll) -> PollView {
    PollView {
        id: poll.id,
        question: poll.question,
        options: poll.options,
        start_date: poll.start_date,
        end_date: poll.end_date,
        status: poll_status(poll.status),
    }
}

pub fn poll_results(results: engine::PollResults) -> PollResultsView {
    PollResultsView {
        poll_id: results.poll_id,
        question: results.question,
        status: poll_status(results.status),
        total_votes: results.total_votes,
        total_credits: results.total_credits,
        options: results
            .options
            .into_iter()
            .map(|tally| OptionTallyView {
                option: tally.option,
                count: tally.count,
                total_credits: tally.total_credits,
            })
            .collect(),
    }
}

pub fn vote(vote: engine::Vote) -> VoteView {
    VoteView {
        id: vote.id,
        team_id: vote.team_id,
        poll_id: vote.poll_id,
        chosen_option: vote.chosen_option,
        credit_staked: vote.credit_staked,
        vote_date: vote.vote_date,
    }
}

pub fn department(department: Department) -> engine::Department {
    match department {
        Department::Dev => engine::Department::Dev,
        Department::Infra => engine::Department::Infra,
        Department::Data => engine::Department::Data,
        Department::Iot => engine::Department::Iot,
        Department::Sysemb => engine::Department::Sysemb,
    }
}

pub fn slot_action(action: SlotAction) -> engine::SlotAction {
    match action {
        SlotAction::Fill => engine::SlotAction::Fill,
        SlotAction::Empty => engine::SlotAction::Empty,
    }
}

fn slot(slot: engine::Slot) -> SlotView {
    SlotView {
        total: slot.total,
        filled: slot.filled,
    }
}

pub fn composition(composition: engine::TeamComposition) -> TeamCompositionView {
    TeamCompositionView {
        id: composition.id,
        name: composition.name,
        dev: slot(composition.dev),
        infra: slot(composition.infra),
        data: slot(composition.data),
        iot: slot(composition.iot),
        sysemb: slot(composition.sysemb),
    }
}
