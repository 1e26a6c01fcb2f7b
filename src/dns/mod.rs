//! DNS records, lookups and name-server selection.
//!
//! This module provides async DNS operations using `hickory-resolver`:
//! - Resolver-independent record types
//! - A [`Lookup`] seam with a real and an in-memory implementation
//! - Per-domain [`Resolver`]s that route queries by [`NameserverStrategy`]
//!
//! Non-existent names and empty answers are not errors; only transport
//! failures are.

mod lookup;
mod records;
mod resolver;

// Re-export public API
pub use hickory_resolver::proto::rr::RecordType;
pub use lookup::{HickoryLookup, Lookup, Nameservers, StaticLookup};
pub use records::{Record, RecordData};
pub use resolver::{NameserverStrategy, Resolver};

pub(crate) use records::normalize_name;
