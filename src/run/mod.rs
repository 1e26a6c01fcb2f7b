//! Check runs over a list of hosts.

mod output;

use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{info, warn};
use serde::Serialize;

use crate::config::{Config, NameserverMode};
use crate::context::CheckContext;
use crate::domain::Domain;
use crate::initialization::init_context;
use crate::redundant::{HostReport, RedundantCheck};

pub use output::render_plain;

/// Results of a check run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    /// One report per input, in input order
    pub reports: Vec<HostReport>,
    /// Number of hosts checked
    pub total_hosts: usize,
    /// Hosts whose configuration is valid
    pub valid: usize,
    /// Hosts whose configuration is invalid
    pub invalid: usize,
    /// Hosts eligible for HTTPS
    pub https_eligible: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Checks every host in the configuration.
///
/// This is the main entry point for the library. It validates the
/// configuration, sets up the DNS and HTTP backends, and checks all hosts
/// concurrently.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a resource cannot be
/// initialized. Failed checks are not errors; they are reported per host.
pub async fn run_checks(config: Config) -> Result<CheckSummary> {
    config.validate().context("Invalid configuration")?;
    let context = init_context(&config).context("Failed to initialize check resources")?;
    Ok(run_checks_with(&config, context).await)
}

/// Checks every host in the configuration against an existing context.
pub async fn run_checks_with(config: &Config, context: CheckContext) -> CheckSummary {
    let start = Instant::now();
    info!(
        "Checking {} host{} using {} name servers",
        config.hosts.len(),
        if config.hosts.len() == 1 { "" } else { "s" },
        config.nameservers
    );

    let reports = join_all(
        config
            .hosts
            .iter()
            .map(|host| check_host(host, &config.nameservers, context.clone())),
    )
    .await;

    let valid = reports.iter().filter(|report| report.valid).count();
    let https_eligible = reports.iter().filter(|report| report.https_eligible).count();
    let summary = CheckSummary {
        total_hosts: reports.len(),
        valid,
        invalid: reports.len() - valid,
        https_eligible,
        elapsed_seconds: start.elapsed().as_secs_f64(),
        reports,
    };
    info!(
        "Checked {} hosts in {:.2}s: {} valid, {} invalid",
        summary.total_hosts, summary.elapsed_seconds, summary.valid, summary.invalid
    );
    summary
}

async fn check_host(input: &str, mode: &NameserverMode, context: CheckContext) -> HostReport {
    let report = match mode {
        NameserverMode::Redundant => RedundantCheck::new(input, context).report().await,
        NameserverMode::Single(strategy) => {
            let domain = Domain::with_strategy(input, strategy.clone(), context);
            HostReport::single(domain.report().await)
        }
    };
    match &report.reason {
        None => info!("{input}: valid ({} name servers)", report.winning_nameservers),
        Some(reason) => warn!("{input}: {}", reason.kind),
    }
    report
}
