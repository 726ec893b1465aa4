// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendrs::application::use_cases::harvest_use_case::HarvestUseCase;
use trendrs::domain::repositories::storage_repository::StorageRepository;
use trendrs::engines::identity::IdentityFactory;
use trendrs::engines::reqwest_engine::ReqwestFetcher;
use trendrs::infrastructure::result_sink::StorageResultSink;
use trendrs::infrastructure::storage::InMemoryStorage;

use super::helpers::{label_for, options, ranked_body, units, RecordingPublisher, StaticUnitSource};

async fn mount_unit(server: &MockServer, id: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/quickbook-search.bms"))
        .and(query_param("r", id))
        .respond_with(template)
        .mount(server)
        .await;
}

fn use_case(server: &MockServer, storage: &InMemoryStorage, cutoff: usize) -> HarvestUseCase {
    let template = format!("{}/quickbook-search.bms?r={{id}}", server.uri());
    let storage: Arc<dyn StorageRepository> = Arc::new(storage.clone());

    HarvestUseCase::new(
        Arc::new(StaticUnitSource(units(&["A", "B", "C"], &template))),
        Arc::new(ReqwestFetcher::new(Duration::from_secs(5))),
        IdentityFactory::new(Duration::from_secs(5)),
        Arc::new(StorageResultSink::new(storage.clone(), "Data", "Trash")),
        storage,
        options(2, cutoff),
    )
    .with_date_code("01022024")
}

#[tokio::test]
async fn test_end_to_end_tie_and_single_failure() {
    let server = MockServer::start().await;
    mount_unit(
        &server,
        "A",
        ResponseTemplate::new(200).set_body_string(ranked_body(&["Alpha", "Beta"])),
    )
    .await;
    mount_unit(
        &server,
        "B",
        ResponseTemplate::new(200).set_body_string(ranked_body(&["Beta", "Alpha"])),
    )
    .await;
    Mock::given(method("GET"))
        .and(query_param("r", "C"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let storage = InMemoryStorage::new();
    let report = use_case(&server, &storage, 2).execute().await.unwrap();

    assert_eq!(report.total_units, 3);
    assert_eq!(report.harvested_units, 2);
    assert_eq!(report.leaderboard.titles(), vec!["Alpha", "Beta"]);
    let points: Vec<u64> = report.leaderboard.iter().map(|e| e.points).collect();
    assert_eq!(points, vec![3, 3]);
    assert!(report.leaderboard.iter().all(|e| e.unit_count == 2));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].unit_id, "C");
    assert_eq!(report.failures[0].label, label_for("C"));

    assert_eq!(
        storage.keys().await,
        vec!["Data/01022024_Rankings.json", "Trash/failures_01022024.json"]
    );
    let raw = storage
        .get("Data/01022024_Rankings.json")
        .await
        .unwrap()
        .unwrap();
    let json: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json["harvested_units"], 2);
    assert_eq!(json["leaderboard"][0]["title"], "Alpha");
    assert!(json["rankings"].get(label_for("C").as_str()).is_none());
}

#[tokio::test]
async fn test_blocked_unit_recovers_with_fresh_identity() {
    let server = MockServer::start().await;
    // First request for A is rate limited, later ones succeed
    Mock::given(method("GET"))
        .and(query_param("r", "A"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_unit(
        &server,
        "A",
        ResponseTemplate::new(200).set_body_string(ranked_body(&["Alpha"])),
    )
    .await;
    mount_unit(
        &server,
        "B",
        ResponseTemplate::new(200).set_body_string(ranked_body(&["Alpha"])),
    )
    .await;
    mount_unit(
        &server,
        "C",
        ResponseTemplate::new(200).set_body_string("<html>Checking your browser</html>"),
    )
    .await;

    let storage = InMemoryStorage::new();
    let report = use_case(&server, &storage, 8).execute().await.unwrap();

    assert_eq!(report.harvested_units, 2);
    assert_eq!(report.leaderboard.titles(), vec!["Alpha"]);
    assert_eq!(report.leaderboard.entries[0].points, 16);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("Unstructured"));
}

#[tokio::test]
async fn test_summary_is_published_and_failure_is_not_fatal() {
    let server = MockServer::start().await;
    for id in ["A", "B", "C"] {
        mount_unit(
            &server,
            id,
            ResponseTemplate::new(200).set_body_string(ranked_body(&["Alpha", "Beta"])),
        )
        .await;
    }

    let publisher = Arc::new(RecordingPublisher {
        fail: true,
        ..RecordingPublisher::default()
    });
    let storage = InMemoryStorage::new();
    let report = use_case(&server, &storage, 2)
        .with_publisher(publisher.clone())
        .execute()
        .await
        .unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(storage.keys().await, vec!["Data/01022024_Rankings.json"]);

    let messages = publisher.messages.lock().clone();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0],
        "Top trending titles for 01022024\n1. Alpha (6 pts, 3 regions)\n2. Beta (3 pts, 3 regions)"
    );
}
