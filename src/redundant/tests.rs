use super::*;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use crate::cdn::CdnRanges;
use crate::dns::{Nameservers, Record, RecordType, StaticLookup};
use crate::domain::StaticProbe;
use crate::error_handling::FailureKind;

const HOST: &str = "www.example.com";

fn context(lookup: StaticLookup) -> CheckContext {
    CheckContext::new(
        Arc::new(lookup),
        Arc::new(StaticProbe::new().served_by_platform("http://www.example.com/")),
        Arc::new(CdnRanges::builtin().unwrap()),
    )
}

fn authoritative_servers() -> Nameservers {
    Nameservers::Addresses(vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 53))])
}

/// Recursive resolvers still serve a stale legacy A record while the zone's
/// own servers already have the new CNAME.
fn propagating_zone() -> StaticLookup {
    StaticLookup::new()
        .with_records([
            Record::ns("example.com", "ns1.example.net"),
            Record::a("ns1.example.net", Ipv4Addr::new(192, 0, 2, 53)),
        ])
        .with_answer(
            HOST,
            RecordType::A,
            vec![Record::a(HOST, Ipv4Addr::new(204, 232, 175, 78))],
        )
        .with_answer_from(
            authoritative_servers(),
            HOST,
            RecordType::A,
            vec![
                Record::cname(HOST, "octocat.github.io"),
                Record::a("octocat.github.io", Ipv4Addr::new(185, 199, 108, 153)),
            ],
        )
}

#[tokio::test]
async fn test_authoritative_answer_wins_during_propagation() {
    let check = RedundantCheck::new(HOST, context(propagating_zone()));

    assert!(check.valid().await);
    assert_eq!(check.reason().await, None);
    assert_eq!(
        check.check().await.strategy(),
        &NameserverStrategy::Authoritative
    );
    assert!(check.https_eligible().await);
    assert_eq!(check.https_eligibility_error().await, None);

    let default = &check.checks()[0];
    assert_eq!(
        default.reason().await.map(|e| e.kind()),
        Some(FailureKind::DeprecatedIp)
    );
    let public = &check.checks()[2];
    assert!(!public.valid().await);
}

#[tokio::test]
async fn test_default_check_is_used_when_nothing_is_valid() {
    let check = RedundantCheck::new(HOST, context(StaticLookup::new()));
    assert!(!check.valid().await);
    assert_eq!(check.check().await.strategy(), &NameserverStrategy::Default);
    assert_eq!(
        check.reason().await.map(|e| e.kind()),
        Some(FailureKind::InvalidDns)
    );
    assert!(!check.https_eligible().await);
    assert_eq!(
        check.https_eligibility_error().await.map(|e| e.kind()),
        Some(FailureKind::InvalidDns)
    );
}

#[tokio::test]
async fn test_default_wins_ties() {
    let lookup = StaticLookup::new().with_answer(
        HOST,
        RecordType::A,
        vec![
            Record::cname(HOST, "octocat.github.io"),
            Record::a("octocat.github.io", Ipv4Addr::new(185, 199, 108, 153)),
        ],
    );
    let check = RedundantCheck::new(HOST, context(lookup));
    assert!(check.valid().await);
    assert_eq!(check.check().await.strategy(), &NameserverStrategy::Default);
}

#[tokio::test]
async fn test_one_check_per_strategy() {
    let check = RedundantCheck::new("https://www.example.com/blog", context(StaticLookup::new()));
    let strategies: Vec<&NameserverStrategy> =
        check.checks().iter().map(|domain| domain.strategy()).collect();
    assert_eq!(
        strategies,
        vec![
            &NameserverStrategy::Default,
            &NameserverStrategy::Authoritative,
            &NameserverStrategy::Public,
        ]
    );
    assert!(check
        .checks()
        .iter()
        .all(|domain| domain.host() == Some(HOST)));
}

#[tokio::test]
async fn test_report_names_the_winner() {
    let check = RedundantCheck::new(HOST, context(propagating_zone()));
    let report = check.report().await;
    assert!(report.valid);
    assert!(report.https_eligible);
    assert_eq!(report.winning_nameservers, "authoritative");
    assert_eq!(report.host.as_deref(), Some(HOST));
    assert_eq!(report.checks.len(), 3);
    assert!(!report.checks[0].valid);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["checks"][0]["reason"]["kind"], "deprecated_ip");
}

#[tokio::test]
async fn test_single_strategy_report_wraps_domain_report() {
    let domain = Domain::with_strategy(
        HOST,
        NameserverStrategy::Authoritative,
        context(propagating_zone()),
    );
    let report = HostReport::single(domain.report().await);
    assert!(report.valid);
    assert_eq!(report.winning_nameservers, "authoritative");
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].nameservers, "authoritative");
}

#[tokio::test]
async fn test_https_eligibility_may_come_from_a_losing_strategy() {
    let apex = "example.com";
    let lookup = StaticLookup::new()
        .with_records([
            Record::ns(apex, "ns1.example.net"),
            Record::soa(apex, "ns1.example.net", "hostmaster.example.net", 1),
            Record::a("ns1.example.net", Ipv4Addr::new(192, 0, 2, 53)),
        ])
        .with_answer(
            apex,
            RecordType::A,
            vec![
                Record::a(apex, Ipv4Addr::new(185, 199, 108, 153)),
                Record::a(apex, Ipv4Addr::new(203, 0, 113, 9)),
            ],
        )
        .with_answer_from(
            authoritative_servers(),
            apex,
            RecordType::A,
            vec![Record::a(apex, Ipv4Addr::new(185, 199, 108, 153))],
        );
    let context = CheckContext::new(
        Arc::new(lookup),
        Arc::new(StaticProbe::new().served_by_platform("http://example.com/")),
        Arc::new(CdnRanges::builtin().unwrap()),
    );
    let check = RedundantCheck::new(apex, context);

    assert!(check.valid().await);
    assert_eq!(check.check().await.strategy(), &NameserverStrategy::Default);
    assert_eq!(
        check.checks()[0]
            .https_eligibility_error()
            .await
            .map(|e| e.kind()),
        Some(FailureKind::ExtraIpsPresent)
    );
    assert!(check.checks()[1].https_eligible().await);

    assert!(check.https_eligible().await);
    assert_eq!(check.https_eligibility_error().await, None);

    let report = check.report().await;
    assert_eq!(report.winning_nameservers, "default");
    assert!(report.https_eligible);
    assert!(report.https_error.is_none());
}
