// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use tracing::info;

use trendrs::application::use_cases::harvest_use_case::{HarvestOptions, HarvestUseCase};
use trendrs::config::settings::Settings;
use trendrs::domain::repositories::result_sink::RunReport;
use trendrs::engines::identity::IdentityFactory;
use trendrs::engines::reqwest_engine::ReqwestFetcher;
use trendrs::infrastructure::observability::metrics::init_metrics;
use trendrs::infrastructure::result_sink::StorageResultSink;
use trendrs::infrastructure::services::webhook_publisher::WebhookPublisher;
use trendrs::infrastructure::storage::create_storage_repository;
use trendrs::infrastructure::work_unit_loader::JsonFileUnitSource;
use trendrs::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并执行一次抓取运行
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting trendrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    init_metrics(&settings.metrics);

    // 3. Wire collaborators
    let storage = create_storage_repository(&settings.storage)?;
    let source = Arc::new(JsonFileUnitSource::new(
        &settings.source.units_path,
        &settings.source.endpoint_template,
    ));
    let sink = Arc::new(StorageResultSink::new(
        storage.clone(),
        &settings.storage.data_dir,
        &settings.storage.trash_dir,
    ));

    let timeout = settings.retry_policy().request_timeout;
    let identities = IdentityFactory::new(timeout)
        .with_header("accept", "application/json, text/plain, */*")
        .with_header("origin", &settings.source.origin)
        .with_header("referer", &settings.source.entry_point)
        .with_warm_up(
            settings
                .harvest
                .warm_up
                .then(|| settings.source.entry_point.clone()),
        );

    let mut use_case = HarvestUseCase::new(
        source,
        Arc::new(ReqwestFetcher::new(timeout)),
        identities,
        sink,
        storage,
        HarvestOptions::from_settings(&settings),
    );
    if settings.publish.enabled {
        let publisher =
            WebhookPublisher::new(&settings.publish.webhook_url, &settings.publish.secret)?;
        use_case = use_case.with_publisher(Arc::new(publisher));
    }

    // 4. Run
    let report = use_case.execute().await?;
    print_leaderboard(&report);

    Ok(())
}

fn print_leaderboard(report: &RunReport) {
    println!(
        "\nLeaderboard for {} ({}/{} units harvested, {} resumed, {} failed)",
        report.date,
        report.harvested_units,
        report.total_units,
        report.resumed_units,
        report.failures.len()
    );
    println!("{:>4}  {:<48} {:>8} {:>8}", "#", "Title", "Points", "Units");
    for entry in report.leaderboard.iter() {
        println!(
            "{:>4}  {:<48} {:>8} {:>8}",
            entry.position, entry.title, entry.points, entry.unit_count
        );
    }
}
