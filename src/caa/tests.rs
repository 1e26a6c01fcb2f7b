use super::*;
use crate::dns::StaticLookup;

fn caa_for(host: &str, lookup: StaticLookup) -> Caa {
    Caa::new(host, NameserverStrategy::Default, Arc::new(lookup))
}

#[tokio::test]
async fn test_lets_encrypt_allowed_by_exact_record() {
    let caa = caa_for(
        "example.com",
        StaticLookup::new().with_records([Record::caa("example.com", "issue", "letsencrypt.org")]),
    );
    assert!(caa.lets_encrypt_allowed().await);
    assert!(caa.records_present().await);
    assert_eq!(caa.issuers().await, vec!["letsencrypt.org"]);
}

#[tokio::test]
async fn test_other_ca_denies_lets_encrypt() {
    let caa = caa_for(
        "example.com",
        StaticLookup::new().with_records([Record::caa("example.com", "issue", "othertCA.com")]),
    );
    assert!(!caa.lets_encrypt_allowed().await);
    assert!(caa.allows("otherTca.com").await);
}

#[tokio::test]
async fn test_no_records_is_permissive() {
    let caa = caa_for("example.com", StaticLookup::new());
    assert!(caa.records().await.is_empty());
    assert!(!caa.errored().await);
    assert!(!caa.records_present().await);
    assert!(caa.allows("anything.example").await);
    assert!(caa.lets_encrypt_allowed().await);
}

#[tokio::test]
async fn test_error_fails_closed() {
    let caa = caa_for(
        "www.example.com",
        StaticLookup::new()
            .with_error("www.example.com", RecordType::CAA)
            .with_records([Record::caa("example.com", "issue", "letsencrypt.org")]),
    );
    assert!(caa.errored().await);
    assert!(caa.error().await.is_some());
    assert!(!caa.records_present().await);
    assert!(!caa.allows("letsencrypt.org").await);
}

#[tokio::test]
async fn test_parent_records_apply_when_host_has_none() {
    let caa = caa_for(
        "www.example.com",
        StaticLookup::new().with_records([Record::caa("example.com", "issue", "digicert.com")]),
    );
    assert_eq!(caa.records().await.len(), 1);
    assert!(!caa.lets_encrypt_allowed().await);
}

#[tokio::test]
async fn test_host_records_shadow_parent() {
    let lookup = Arc::new(StaticLookup::new().with_records([
        Record::caa("www.example.com", "issue", "letsencrypt.org"),
        Record::caa("example.com", "issue", "digicert.com"),
    ]));
    let caa = Caa::new("www.example.com", NameserverStrategy::Default, lookup.clone());
    assert!(caa.lets_encrypt_allowed().await);
    assert!(lookup
        .queries()
        .iter()
        .all(|(_, name, _)| name == "www.example.com"));
}

#[tokio::test]
async fn test_only_one_level_is_walked() {
    let caa = caa_for(
        "a.b.example.com",
        StaticLookup::new().with_records([Record::caa("example.com", "issue", "digicert.com")]),
    );
    assert!(caa.records().await.is_empty());
    assert!(caa.lets_encrypt_allowed().await);
}

#[tokio::test]
async fn test_single_label_parent_is_not_queried() {
    let lookup = Arc::new(StaticLookup::new());
    let caa = Caa::new("example.com", NameserverStrategy::Default, lookup.clone());
    caa.records().await;
    let names: Vec<String> = lookup.queries().into_iter().map(|(_, name, _)| name).collect();
    assert_eq!(names, vec!["example.com"]);
}

#[tokio::test]
async fn test_non_issue_tags_are_ignored() {
    let caa = caa_for(
        "example.com",
        StaticLookup::new().with_records([
            Record::caa("example.com", "iodef", "mailto:security@example.com"),
            Record::caa("example.com", "issuewild", "digicert.com"),
        ]),
    );
    assert!(caa.records().await.is_empty());
    assert!(caa.lets_encrypt_allowed().await);
}
