// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use trendrs::application::use_cases::harvest_use_case::{HarvestOptions, HarvestUseCase};
use trendrs::domain::models::unit_result::UnitPayload;
use trendrs::domain::models::work_unit::WorkUnit;
use trendrs::domain::repositories::storage_repository::StorageRepository;
use trendrs::engines::identity::IdentityFactory;
use trendrs::infrastructure::checkpoint::{CheckpointEntry, CheckpointStore, CheckpointUnits};
use trendrs::infrastructure::result_sink::StorageResultSink;
use trendrs::infrastructure::storage::InMemoryStorage;

use super::helpers::{
    label_for, options, ranked_body, units, with_checkpoint, with_checkpoint_threshold,
    Behaviour, RecordingStorage, StaticUnitSource, StubFetcher, STUB_TEMPLATE,
};

const DATE: &str = "01022024";
const CHECKPOINT_KEY: &str = "checkpoints/01022024.json";

fn build(
    fetcher: Arc<StubFetcher>,
    storage: Arc<dyn StorageRepository>,
    units: Vec<WorkUnit>,
    options: HarvestOptions,
) -> HarvestUseCase {
    HarvestUseCase::new(
        Arc::new(StaticUnitSource(units)),
        fetcher,
        IdentityFactory::new(Duration::from_secs(1)),
        Arc::new(StorageResultSink::new(storage.clone(), "Data", "Trash")),
        storage,
        options,
    )
    .with_date_code(DATE)
}

fn use_case(fetcher: Arc<StubFetcher>, storage: &InMemoryStorage) -> HarvestUseCase {
    build(
        fetcher,
        Arc::new(storage.clone()),
        units(&["A", "B", "C"], STUB_TEMPLATE),
        with_checkpoint(options(2, 2), 1),
    )
}

fn ranked(titles: &[&str]) -> UnitPayload {
    UnitPayload::Ranked(titles.iter().map(|t| t.to_string()).collect())
}

async fn seed_checkpoint(storage: &InMemoryStorage, entries: &[(usize, &str, &[&str])]) {
    let saved: CheckpointUnits = entries
        .iter()
        .map(|(sequence, id, titles)| (*sequence, CheckpointEntry::new(*id, ranked(titles))))
        .collect();
    CheckpointStore::new(Arc::new(storage.clone()), DATE)
        .save(&saved)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_checkpointed_units_are_not_fetched_again() {
    let storage = InMemoryStorage::new();
    seed_checkpoint(&storage, &[(0, "A", &["Alpha", "Beta"])]).await;

    let fetcher = Arc::new(
        StubFetcher::new()
            .on("B", Behaviour::Json(ranked_body(&["Beta", "Alpha"])))
            .on("C", Behaviour::Json(ranked_body(&["Gamma"]))),
    );
    let report = use_case(fetcher.clone(), &storage).execute().await.unwrap();

    assert_eq!(fetcher.calls("A"), 0);
    assert_eq!(fetcher.calls("B"), 1);
    assert_eq!(report.resumed_units, 1);
    assert_eq!(report.harvested_units, 3);

    // The resumed unit keeps its original position for tie-breaking
    assert_eq!(report.leaderboard.titles(), vec!["Alpha", "Beta", "Gamma"]);
    assert!(report.rankings.contains_key(&label_for("A")));

    // A clean run removes its checkpoint
    assert!(!storage.exists(CHECKPOINT_KEY).await.unwrap());
}

#[tokio::test]
async fn test_checkpoint_is_kept_when_units_fail() {
    let storage = InMemoryStorage::new();
    let fetcher = Arc::new(
        StubFetcher::new()
            .on("A", Behaviour::Json(ranked_body(&["Alpha"])))
            .on("B", Behaviour::Status(503))
            .on("C", Behaviour::Json(ranked_body(&["Gamma"]))),
    );

    let report = use_case(fetcher, &storage).execute().await.unwrap();
    assert_eq!(report.failures.len(), 1);

    let restored = CheckpointStore::new(Arc::new(storage.clone()), DATE)
        .load()
        .await
        .unwrap();
    let kept: Vec<(usize, &str)> = restored
        .iter()
        .map(|(sequence, entry)| (*sequence, entry.unit_id.as_str()))
        .collect();
    assert_eq!(kept, vec![(0, "A"), (2, "C")]);

    // A second run only retries the failed unit
    let retry = Arc::new(StubFetcher::new().on("B", Behaviour::Json(ranked_body(&["Beta"]))));
    let report = use_case(retry.clone(), &storage).execute().await.unwrap();

    assert_eq!(retry.total_calls(), 1);
    assert_eq!(report.resumed_units, 2);
    assert!(report.failures.is_empty());
    assert!(!storage.exists(CHECKPOINT_KEY).await.unwrap());
}

#[tokio::test]
async fn test_truncated_checkpoint_does_not_stop_the_run() {
    let storage = InMemoryStorage::new();
    storage
        .save(CHECKPOINT_KEY, br#"{"date":"01022024","units":{"0":{"mo"#)
        .await
        .unwrap();

    let fetcher = Arc::new(
        StubFetcher::new()
            .on("A", Behaviour::Json(ranked_body(&["Alpha"])))
            .on("B", Behaviour::Json(ranked_body(&["Beta"])))
            .on("C", Behaviour::Json(ranked_body(&["Gamma"]))),
    );
    let report = use_case(fetcher.clone(), &storage).execute().await.unwrap();

    assert_eq!(fetcher.calls("A"), 1);
    assert_eq!(report.resumed_units, 0);
    assert_eq!(report.harvested_units, 3);
    assert_eq!(report.leaderboard.len(), 3);

    // The unreadable file is moved aside and the clean run leaves no checkpoint
    assert_eq!(
        storage.keys().await,
        vec![
            "Data/01022024_Rankings.json",
            "checkpoints/01022024.corrupt.json"
        ]
    );
}

#[tokio::test]
async fn test_checkpoint_for_another_date_is_ignored() {
    let storage = InMemoryStorage::new();
    storage
        .save(
            CHECKPOINT_KEY,
            br#"{"date":"31012024","units":{"0":{"unit_id":"A","payload":{"mode":"ranked","entries":["Stale"]}}}}"#,
        )
        .await
        .unwrap();

    let fetcher = Arc::new(StubFetcher::new().on("A", Behaviour::Json(ranked_body(&["Alpha"]))));
    let report = use_case(fetcher.clone(), &storage).execute().await.unwrap();

    assert_eq!(fetcher.calls("A"), 1);
    assert_eq!(report.resumed_units, 0);
    assert!(!report.leaderboard.titles().contains(&"Stale"));
}

#[tokio::test]
async fn test_units_sharing_a_label_resume_independently() {
    let storage = InMemoryStorage::new();
    seed_checkpoint(&storage, &[(0, "X", &["Alpha"])]).await;

    let shared = vec![
        WorkUnit::new("X", "Pune", STUB_TEMPLATE),
        WorkUnit::new("Y", "Pune", STUB_TEMPLATE),
    ];
    let fetcher = Arc::new(StubFetcher::new().on("Y", Behaviour::Json(ranked_body(&["Beta"]))));
    let report = build(
        fetcher.clone(),
        Arc::new(storage.clone()),
        shared,
        with_checkpoint(options(2, 2), 1),
    )
    .execute()
    .await
    .unwrap();

    // Only the checkpointed sequence is skipped; its payload is folded once
    assert_eq!(fetcher.calls("X"), 0);
    assert_eq!(fetcher.calls("Y"), 1);
    assert_eq!(report.resumed_units, 1);
    assert_eq!(report.harvested_units, 2);

    let points: Vec<(&str, u64)> = report
        .leaderboard
        .iter()
        .map(|entry| (entry.title.as_str(), entry.points))
        .collect();
    assert_eq!(points, vec![("Alpha", 2), ("Beta", 2)]);

    // The lower sequence owns the shared label in the rankings artifact
    assert_eq!(report.rankings.get("Pune"), Some(&ranked(&["Alpha"])));
}

#[tokio::test]
async fn test_error_threshold_flushes_before_the_run_ends() {
    let storage = Arc::new(RecordingStorage::new());
    let fetcher = Arc::new(
        StubFetcher::new()
            .on("A", Behaviour::Json(ranked_body(&["Alpha"])))
            .on("B", Behaviour::Status(503))
            .on("C", Behaviour::Json(ranked_body(&["Gamma"])))
            .on("D", Behaviour::Json(ranked_body(&["Delta"]))),
    );

    // One worker keeps completion order equal to submission order
    let report = build(
        fetcher,
        storage.clone(),
        units(&["A", "B", "C", "D"], STUB_TEMPLATE),
        with_checkpoint_threshold(options(1, 2), 100, 1),
    )
    .execute()
    .await
    .unwrap();
    assert_eq!(report.failures.len(), 1);

    assert_eq!(
        storage.events(),
        vec![
            "checkpoint:1",
            "Data/01022024_Rankings.json",
            "Trash/failures_01022024.json",
            "checkpoint:3",
        ]
    );
}

#[tokio::test]
async fn test_interval_flushes_every_n_successes() {
    let storage = Arc::new(RecordingStorage::new());
    let fetcher = Arc::new(StubFetcher::new());

    let report = build(
        fetcher,
        storage.clone(),
        units(&["A", "B", "C", "D", "E"], STUB_TEMPLATE),
        with_checkpoint(options(1, 2), 2),
    )
    .execute()
    .await
    .unwrap();
    assert!(report.failures.is_empty());

    assert_eq!(storage.checkpoint_sizes(), vec![2, 4]);
    assert_eq!(
        storage.events().last().map(String::as_str),
        Some("Data/01022024_Rankings.json")
    );
    assert!(!storage.exists(CHECKPOINT_KEY).await.unwrap());
}
