//! pages_domain_check library: custom-domain validation for GitHub Pages
//!
//! This library checks whether a custom domain's DNS is configured correctly
//! for GitHub Pages and whether the site can be served over HTTPS with an
//! automatically issued certificate.
//!
//! # Example
//!
//! ```no_run
//! use pages_domain_check::{run_checks, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     hosts: vec!["www.example.com".to_string()],
//!     ..Default::default()
//! };
//!
//! let summary = run_checks(config).await?;
//! for report in &summary.reports {
//!     println!("{}: valid={} https={}", report.input, report.valid, report.https_eligible);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod caa;
pub mod cdn;
pub mod config;
mod context;
pub mod dns;
pub mod domain;
pub mod error_handling;
pub mod initialization;
pub mod redundant;
mod run;

// Re-export public API
pub use caa::Caa;
pub use config::{Cli, Config, LogFormat, LogLevel, NameserverMode, OutputFormat};
pub use context::CheckContext;
pub use dns::{NameserverStrategy, Resolver};
pub use domain::{Domain, DomainReport, FailureReport};
pub use error_handling::{CheckFailure, FailureKind};
pub use redundant::{HostReport, RedundantCheck};
pub use run::{render_plain, run_checks, run_checks_with, CheckSummary};
