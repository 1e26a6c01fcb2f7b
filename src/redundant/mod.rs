//! Cross-resolver arbitration.
//!
//! DNS answers differ between resolvers while changes propagate. A
//! [`RedundantCheck`] runs the same [`Domain`] check against the default,
//! authoritative and public name servers and reports the most favorable
//! verdict.

use futures::future::join_all;
use log::debug;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::context::CheckContext;
use crate::dns::NameserverStrategy;
use crate::domain::{Domain, DomainReport, FailureReport};
use crate::error_handling::CheckFailure;

/// Strategies tried, in order of preference.
pub const STRATEGIES: [NameserverStrategy; 3] = [
    NameserverStrategy::Default,
    NameserverStrategy::Authoritative,
    NameserverStrategy::Public,
];

/// Result for one host across all strategies.
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub input: String,
    pub host: Option<String>,
    pub valid: bool,
    pub reason: Option<FailureReport>,
    pub https_eligible: bool,
    pub https_error: Option<FailureReport>,
    /// Strategy whose verdict was used
    pub winning_nameservers: String,
    pub checks: Vec<DomainReport>,
}

/// One host checked with every strategy in [`STRATEGIES`].
pub struct RedundantCheck {
    input: String,
    checks: Vec<Domain>,
    winner: OnceCell<usize>,
}

impl HostReport {
    /// Wraps a check pinned to one strategy.
    pub fn single(report: DomainReport) -> Self {
        Self {
            input: report.input.clone(),
            host: report.host.clone(),
            valid: report.valid,
            reason: report.reason.clone(),
            https_eligible: report.https_eligible,
            https_error: report.https_error.clone(),
            winning_nameservers: report.nameservers.clone(),
            checks: vec![report],
        }
    }
}

impl RedundantCheck {
    pub fn new(input: &str, context: CheckContext) -> Self {
        let checks = STRATEGIES
            .iter()
            .map(|strategy| Domain::with_strategy(input, strategy.clone(), context.clone()))
            .collect();
        Self {
            input: input.to_string(),
            checks,
            winner: OnceCell::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// One check per strategy, in [`STRATEGIES`] order.
    pub fn checks(&self) -> &[Domain] {
        &self.checks
    }

    /// The first valid check, or the default-strategy check when none is valid.
    pub async fn check(&self) -> &Domain {
        let index = *self
            .winner
            .get_or_init(|| async {
                let verdicts = join_all(self.checks.iter().map(|domain| domain.valid())).await;
                let index = verdicts.iter().position(|valid| *valid).unwrap_or(0);
                debug!(
                    "{}: using {} name servers ({:?})",
                    self.input, STRATEGIES[index], verdicts
                );
                index
            })
            .await;
        &self.checks[index]
    }

    pub async fn valid(&self) -> bool {
        self.check().await.valid().await
    }

    pub async fn reason(&self) -> Option<CheckFailure> {
        self.check().await.reason().await
    }

    /// Whether any strategy finds the host eligible for HTTPS.
    pub async fn https_eligible(&self) -> bool {
        join_all(self.checks.iter().map(|domain| domain.https_eligible()))
            .await
            .into_iter()
            .any(|eligible| eligible)
    }

    /// The winning check's HTTPS failure, `None` when eligible overall.
    pub async fn https_eligibility_error(&self) -> Option<CheckFailure> {
        if self.https_eligible().await {
            return None;
        }
        self.check().await.https_eligibility_error().await
    }

    pub async fn report(&self) -> HostReport {
        let winner = self.check().await;
        let reason = self.reason().await;
        let https_eligible = self.https_eligible().await;
        let https_error = self.https_eligibility_error().await;
        let checks = join_all(self.checks.iter().map(|domain| domain.report())).await;

        HostReport {
            input: self.input.clone(),
            host: winner.host().map(str::to_string),
            valid: reason.is_none(),
            reason: reason.as_ref().map(FailureReport::from),
            https_eligible,
            https_error: https_error.as_ref().map(FailureReport::from),
            winning_nameservers: winner.strategy().to_string(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests;
