mod common;

use engine::{Actor, DEFAULT_CREDIT, Department, EngineError, Resource, Slot, SlotAction};

use common::{ADMIN, ledger};

#[tokio::test]
async fn new_team_defaults_credit_and_rejects_duplicates() {
    let ledger = ledger().await;
    let team = ledger
        .engine
        .new_team(&ADMIN, "  Alpha ", "Alpha@Example.org", None)
        .await
        .unwrap();
    assert_eq!(team.name, "Alpha");
    assert_eq!(team.email, "alpha@example.org");
    assert_eq!(team.credit, DEFAULT_CREDIT);

    let err = ledger
        .engine
        .new_team(&ADMIN, "Alpha", "other@example.org", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyExists("team name".to_string()));

    let err = ledger
        .engine
        .new_team(&ADMIN, "Beta", "alpha@example.org", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyExists("team email".to_string()));

    let err = ledger
        .engine
        .new_team(&Actor::Team { team_id: team.id }, "Gamma", "g@example.org", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn team_email_update_is_validated() {
    let ledger = ledger().await;
    let alpha = ledger.team("Alpha", 100).await;
    ledger.team("Beta", 100).await;

    let updated = ledger
        .engine
        .update_team_email(alpha.id, " Crew@Example.COM ")
        .await
        .unwrap();
    assert_eq!(updated.email, "crew@example.com");
    assert_eq!(updated.credit, 100);

    let err = ledger
        .engine
        .update_team_email(alpha.id, "not-an-email")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    let err = ledger
        .engine
        .update_team_email(alpha.id, "beta@example.org")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists(_)));

    let teams = ledger.engine.teams(&ADMIN).await.unwrap();
    let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn catalog_lists_active_resources_by_kind() {
    let ledger = ledger().await;
    ledger.resource("GPU", 10, 5, 5).await;
    ledger.non_returnable("Coffee", 1, 50).await;
    let mut hidden = Resource::new("Prototype".to_string(), 1, 1, 1, "hardware".to_string()).unwrap();
    hidden.is_active = false;
    let hidden = ledger.engine.new_resource(&ADMIN, hidden).await.unwrap();

    let all = ledger.engine.resources(None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Coffee", "GPU"]);

    let hardware = ledger.engine.resources(Some("hardware")).await.unwrap();
    assert_eq!(hardware.len(), 1);
    assert_eq!(hardware[0].name, "GPU");

    // Direct lookups still see inactive resources.
    assert!(!ledger.engine.resource(hidden.id).await.unwrap().is_active);

    let err = ledger
        .engine
        .new_resource(
            &ADMIN,
            Resource::new("  ".to_string(), 1, 1, 1, "perk".to_string()).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test]
async fn composition_slots_are_clamped() {
    let ledger = ledger().await;
    let composition = ledger
        .engine
        .new_team_composition(&ADMIN, "Squad", [2, 1, 0, 0, 0])
        .await
        .unwrap();

    let mut current = composition.clone();
    for _ in 0..3 {
        current = ledger
            .engine
            .toggle_team_slot(&ADMIN, composition.id, Department::Dev, SlotAction::Fill)
            .await
            .unwrap();
    }
    assert_eq!(current.dev, Slot { total: 2, filled: 2 });

    let current = ledger
        .engine
        .toggle_team_slot(&ADMIN, composition.id, Department::Infra, SlotAction::Empty)
        .await
        .unwrap();
    assert_eq!(current.infra, Slot { total: 1, filled: 0 });
    assert_eq!(current.dev.filled, 2);

    let listed = ledger.engine.team_compositions(&ADMIN).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], current);

    let err = ledger
        .engine
        .new_team_composition(&ADMIN, "Squad", [1, 1, 1, 1, 1])
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyExists("Squad".to_string()));

    let err = ledger
        .engine
        .toggle_team_slot(&ADMIN, 999, Department::Dev, SlotAction::Fill)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
