mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use engine::{EngineError, PollStatus};
use tokio::task::JoinSet;

use common::{ADMIN, file_ledger, ledger, retry_locked};

#[tokio::test]
async fn vote_debits_the_stake_once() {
    let ledger = ledger().await;
    let team = ledger.team("Alpha", 100).await;
    let poll = ledger.open_poll(&["A", "B"]).await;

    let vote = ledger.engine.cast_vote(team.id, poll.id, "A", 30).await.unwrap();
    assert_eq!(vote.chosen_option, "A");
    assert_eq!(vote.credit_staked, 30);
    assert_eq!(ledger.credit(team.id).await, 70);

    for option in ["A", "B"] {
        let err = ledger
            .engine
            .cast_vote(team.id, poll.id, option, 10)
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadyVoted(poll.id.to_string()));
    }
    assert_eq!(ledger.credit(team.id).await, 70);

    let stored = ledger.engine.vote_for_poll(team.id, poll.id).await.unwrap();
    assert_eq!(stored.id, vote.id);
}

#[tokio::test]
async fn closed_poll_rejects_votes() {
    let ledger = ledger().await;
    let team = ledger.team("Alpha", 100).await;
    let poll = ledger.open_poll(&["A", "B"]).await;
    ledger
        .engine
        .set_poll_status(&ADMIN, poll.id, PollStatus::Closed)
        .await
        .unwrap();

    let err = ledger
        .engine
        .cast_vote(team.id, poll.id, "A", 10)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PollClosed(poll.id.to_string()));
    assert_eq!(ledger.credit(team.id).await, 100);
}

#[tokio::test]
async fn poll_state_is_checked_before_the_team() {
    let ledger = ledger().await;
    let poll = ledger.open_poll(&["A", "B"]).await;
    ledger
        .engine
        .set_poll_status(&ADMIN, poll.id, PollStatus::Closed)
        .await
        .unwrap();

    let err = ledger
        .engine
        .cast_vote(999, poll.id, "A", 10)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PollClosed(poll.id.to_string()));

    let open = ledger.open_poll(&["A", "B"]).await;
    let err = ledger
        .engine
        .cast_vote(999, open.id, "C", 10)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidOption("C".to_string()));
}

#[tokio::test]
async fn vote_outside_window_is_inactive() {
    let ledger = ledger().await;
    let team = ledger.team("Alpha", 100).await;
    let now = Utc::now();
    let later = ledger
        .engine
        .new_poll(
            &ADMIN,
            "Next year?",
            vec!["Yes".to_string(), "No".to_string()],
            now + Duration::days(1),
            now + Duration::days(2),
        )
        .await
        .unwrap();

    let err = ledger
        .engine
        .cast_vote(team.id, later.id, "Yes", 10)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PollInactive(later.id.to_string()));
}

#[tokio::test]
async fn unknown_option_and_missing_poll_are_rejected() {
    let ledger = ledger().await;
    let team = ledger.team("Alpha", 100).await;
    let poll = ledger.open_poll(&["A", "B"]).await;

    let err = ledger
        .engine
        .cast_vote(team.id, poll.id, "C", 10)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidOption("C".to_string()));

    let err = ledger
        .engine
        .cast_vote(team.id, 999, "A", 10)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("poll 999".to_string()));
    assert_eq!(ledger.credit(team.id).await, 100);
}

#[tokio::test]
async fn stake_must_be_positive_and_affordable() {
    let ledger = ledger().await;
    let team = ledger.team("Alpha", 20).await;
    let poll = ledger.open_poll(&["A", "B"]).await;

    let err = ledger
        .engine
        .cast_vote(team.id, poll.id, "A", 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    let err = ledger
        .engine
        .cast_vote(team.id, poll.id, "A", 21)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientCredit(_)));

    // A failed attempt does not count as a vote.
    ledger.engine.cast_vote(team.id, poll.id, "A", 20).await.unwrap();
    assert_eq!(ledger.credit(team.id).await, 0);
}

#[tokio::test]
async fn results_tally_every_option() {
    let ledger = ledger().await;
    let alpha = ledger.team("Alpha", 100).await;
    let beta = ledger.team("Beta", 100).await;
    let gamma = ledger.team("Gamma", 100).await;
    let poll = ledger.open_poll(&["Rust", "Go", "Zig"]).await;

    ledger.engine.cast_vote(alpha.id, poll.id, "Rust", 10).await.unwrap();
    ledger.engine.cast_vote(beta.id, poll.id, "Rust", 25).await.unwrap();
    ledger.engine.cast_vote(gamma.id, poll.id, "Go", 5).await.unwrap();

    let results = ledger.engine.poll_results(poll.id).await.unwrap();
    assert_eq!(results.total_votes, 3);
    assert_eq!(results.total_credits, 40);
    let tallies: Vec<(String, i64, i64)> = results
        .options
        .into_iter()
        .map(|o| (o.option, o.count, o.total_credits))
        .collect();
    assert_eq!(
        tallies,
        vec![
            ("Rust".to_string(), 2, 35),
            ("Go".to_string(), 1, 5),
            ("Zig".to_string(), 0, 0),
        ]
    );

    let (_, votes) = ledger.engine.poll(poll.id).await.unwrap();
    assert_eq!(votes.len(), 3);
    assert_eq!(ledger.engine.team_votes(beta.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_vote_is_not_found() {
    let ledger = ledger().await;
    let team = ledger.team("Alpha", 100).await;
    let poll = ledger.open_poll(&["A"]).await;

    let err = ledger
        .engine
        .vote_for_poll(team.id, poll.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn polls_are_listed_by_status() {
    let ledger = ledger().await;
    let open = ledger.open_poll(&["A"]).await;
    let closed = ledger.open_poll(&["B"]).await;
    ledger
        .engine
        .set_poll_status(&ADMIN, closed.id, PollStatus::Closed)
        .await
        .unwrap();

    let listed = ledger.engine.polls(Some(PollStatus::Open)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, open.id);
    assert_eq!(ledger.engine.polls(None).await.unwrap().len(), 2);

    let err = ledger
        .engine
        .new_poll(&ADMIN, "Dup?", vec!["A".to_string(), "A".to_string()], Utc::now(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes_count_once() {
    let ledger = file_ledger().await;
    let team = ledger.team("Alpha", 1000).await;
    let poll = ledger.open_poll(&["A", "B"]).await;
    let (team_id, poll_id) = (team.id, poll.id);
    let engine = Arc::new(ledger.engine);

    let mut tasks = JoinSet::new();
    for n in 0..20 {
        let engine = Arc::clone(&engine);
        let option = if n % 2 == 0 { "A" } else { "B" };
        tasks.spawn(async move {
            retry_locked(|| engine.cast_vote(team_id, poll_id, option, 10)).await
        });
    }
    let mut cast = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => cast += 1,
            Err(err) => assert_eq!(err, EngineError::AlreadyVoted(poll.id.to_string())),
        }
    }

    assert_eq!(cast, 1);
    assert_eq!(engine.team_profile(team.id).await.unwrap().credit, 990);
    assert_eq!(engine.team_votes(team.id).await.unwrap().len(), 1);
}
