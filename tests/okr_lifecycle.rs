//! End-to-end lifecycle over the in-memory ticket store: objective
//! creation, KR creation with linking and parent rewrite, partial update,
//! activity logging and hierarchy resolution.

use std::sync::Arc;

use okr_tracker::config::Settings;
use okr_tracker::gitlab::{InMemoryTicketStore, TicketStore};
use okr_tracker::models::{
    Activity, FieldUpdate, KrCreateRequest, KrUpdateRequest, ObjectiveCreateRequest,
};
use okr_tracker::okr::activity_table::AppendStrategy;
use okr_tracker::services::{ActivityService, KrService, ObjectiveService};

fn settings() -> Settings {
    Settings {
        gitlab_api_url: "https://gitlab.example.com".to_string(),
        gitlab_access_token: "token".to_string(),
        gitlab_project_id: "okr/okr".to_string(),
        gitlab_objective_labels: vec!["OKR::Objetivo".to_string(), "2025".to_string()],
        gitlab_kr_labels: vec!["OKR::KR".to_string(), "2025".to_string()],
        kr_reference_label: "OKR::KR".to_string(),
        auth_username: String::new(),
        auth_password: String::new(),
        auth_secret: String::new(),
        auth_token_expire_minutes: 30,
        port: 8000,
    }
}

struct Harness {
    store: Arc<InMemoryTicketStore>,
    objectives: ObjectiveService,
    krs: KrService,
    activities: ActivityService,
}

impl Harness {
    fn new() -> Self {
        let settings = settings();
        let store = Arc::new(InMemoryTicketStore::new());
        Self {
            objectives: ObjectiveService::new(store.clone(), &settings),
            krs: KrService::new(store.clone(), &settings),
            activities: ActivityService::new(store.clone()),
            store,
        }
    }
}

fn objective_request() -> ObjectiveCreateRequest {
    ObjectiveCreateRequest {
        obj_number: 1,
        title: "Grow Revenue".to_string(),
        description: "Increase ARR".to_string(),
        team_label: "TEAM::Growth".to_string(),
        product_label: "PRODUCT::Checkout".to_string(),
    }
}

fn kr_request(objective_iid: u64, number: u32, title: &str) -> KrCreateRequest {
    KrCreateRequest {
        objective_iid,
        kr_number: number,
        title: title.to_string(),
        description: "Reach 100 paying customers".to_string(),
        meta_prevista: 100.0,
        meta_realizada: 0.0,
        responsaveis: vec!["Ana".to_string()],
        team_label: None,
        product_label: None,
    }
}

#[tokio::test]
async fn full_okr_lifecycle() {
    let harness = Harness::new();

    // -- Objective creation --------------------------------------------------
    let objective = harness.objectives.create(objective_request()).await.unwrap();
    assert_eq!(objective.title, "OBJ1: GROW REVENUE");
    assert!(objective.description.contains("> Increase ARR"));
    assert!(objective.description.contains("### Resultados Chave"));
    assert!(!objective.description.contains("- [ ]"));

    // -- KR creation ---------------------------------------------------------
    let kr = harness
        .krs
        .create(kr_request(objective.id, 1, "Close enterprise deals"))
        .await
        .unwrap();
    assert_eq!(kr.title, "OBJ1 - KR1: Close enterprise deals");
    assert_eq!(kr.kr_number, 1);
    assert_eq!(kr.display_title, "Close enterprise deals");
    assert_eq!(kr.objective_iid, Some(objective.id));

    let parent = harness.objectives.get(objective.id).await.unwrap();
    let checklist_line = format!("- [ ] **{}** ~\"OKR::KR\"", kr.title);
    assert!(parent.description.contains(&checklist_line));
    assert_eq!(parent.description.matches("- [ ]").count(), 1);

    // -- Partial update ------------------------------------------------------
    let fetched = harness.krs.get(kr.id).await.unwrap();
    assert_eq!(fetched.objective_iid, Some(objective.id));

    let updated = harness
        .krs
        .update(
            kr.id,
            KrUpdateRequest {
                meta_realizada: FieldUpdate::Set(40.0),
                ..KrUpdateRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, kr.title);
    assert!(updated.description.contains("**Meta realizada**: 40%"));
    assert!(updated.description.contains("**Meta prevista**: 100%"));
    assert!(updated.description.contains("**Responsável(eis)**: Ana"));

    // -- Activity log --------------------------------------------------------
    let first = Activity {
        project_action_activity: "Qualify pipeline".to_string(),
        stakeholders: "Sales".to_string(),
        deadline_planned: "Q1/2025".to_string(),
        deadline_achieved: Some("Q1/2025".to_string()),
        progress_planned_percent: 100.0,
        progress_achieved_percent: 100.0,
    };
    let second = Activity {
        project_action_activity: "Run pilot".to_string(),
        stakeholders: "Solutions".to_string(),
        deadline_planned: "Q2/2025".to_string(),
        deadline_achieved: None,
        progress_planned_percent: 100.0,
        progress_achieved_percent: 25.0,
    };

    harness
        .activities
        .append(kr.id, std::slice::from_ref(&first), AppendStrategy::BlindAppend)
        .await
        .unwrap();
    harness
        .activities
        .append(kr.id, std::slice::from_ref(&second), AppendStrategy::BlindAppend)
        .await
        .unwrap();

    let logged = harness.activities.list(kr.id).await.unwrap();
    assert_eq!(logged, vec![first.clone(), second.clone()]);

    // A later field update must not disturb the logged rows.
    let after_update = harness
        .krs
        .update(
            kr.id,
            KrUpdateRequest {
                meta_realizada: FieldUpdate::Set(55.0),
                ..KrUpdateRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(after_update.description.contains("| Qualify pipeline |"));
    assert!(after_update.description.contains("| Run pilot |"));
    assert_eq!(
        harness.activities.list(kr.id).await.unwrap(),
        vec![first, second]
    );

    // -- Hierarchy resolution ------------------------------------------------
    let second_kr = harness
        .krs
        .create(kr_request(objective.id, 2, "Expand into EMEA"))
        .await
        .unwrap();

    // A linked ticket without KR labels must never surface as a KR.
    let note = harness
        .store
        .create_ticket("Planning note", "", &["note".to_string()])
        .await
        .unwrap();
    harness
        .store
        .link_tickets(note.iid, objective.id)
        .await
        .unwrap();

    let children = harness.krs.list_for_objective(objective.id).await.unwrap();
    let mut child_ids: Vec<u64> = children.iter().map(|kr| kr.id).collect();
    child_ids.sort_unstable();
    let mut expected = vec![kr.id, second_kr.id];
    expected.sort_unstable();
    assert_eq!(child_ids, expected);

    // Both checklist lines are present, newest first.
    let parent = harness.objectives.get(objective.id).await.unwrap();
    let first_position = parent.description.find("KR2: Expand into EMEA").unwrap();
    let second_position = parent
        .description
        .find("KR1: Close enterprise deals")
        .unwrap();
    assert!(first_position < second_position);
}

#[tokio::test]
async fn explicit_empty_update_sets_sentinels() {
    let harness = Harness::new();
    let objective = harness.objectives.create(objective_request()).await.unwrap();
    let kr = harness
        .krs
        .create(kr_request(objective.id, 1, "Close enterprise deals"))
        .await
        .unwrap();

    let updated = harness
        .krs
        .update(
            kr.id,
            KrUpdateRequest {
                description: FieldUpdate::Set(String::new()),
                responsaveis: FieldUpdate::Set(vec![]),
                ..KrUpdateRequest::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.description.contains("> Sem descrição"));
    assert!(updated.description.contains("**Responsável(eis)**: N/A"));
}

#[tokio::test]
async fn kr_creation_under_hand_edited_objective_uses_fallback_prefix() {
    let harness = Harness::new();
    let parent = harness
        .store
        .create_ticket(
            "Some free text",
            "Desc",
            &["OKR::Objetivo".to_string(), "2025".to_string()],
        )
        .await
        .unwrap();

    let kr = harness
        .krs
        .create(kr_request(parent.iid, 3, "Fallback KR"))
        .await
        .unwrap();

    assert!(kr
        .title
        .starts_with(&format!("OBJ{} - KR3:", parent.iid)));
}
