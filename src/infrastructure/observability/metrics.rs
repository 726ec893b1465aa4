// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 初始化指标系统
///
/// 未启用时不安装任何记录器，`metrics` 宏调用成为空操作。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!(
        "harvest_units_total",
        "Work units processed, labelled by outcome"
    );
    describe_counter!(
        "harvest_units_failed_total",
        "Work units that exhausted their attempts"
    );
    describe_counter!(
        "harvest_blocked_total",
        "Attempts classified as blocked by the remote service"
    );
    describe_counter!(
        "harvest_identities_created_total",
        "Simulated client identities constructed"
    );
    describe_histogram!(
        "harvest_attempt_duration_seconds",
        Unit::Seconds,
        "Duration of a single fetch attempt"
    );
}
