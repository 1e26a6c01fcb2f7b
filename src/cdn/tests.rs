use super::*;
use std::io::Write;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_builtin_ranges_load() {
    let ranges = CdnRanges::builtin().expect("built-in lists parse");
    assert!(!ranges.ranges(Cdn::Cloudflare).is_empty());
    assert!(!ranges.ranges(Cdn::Fastly).is_empty());
}

#[test]
fn test_cloudflare_ownership() {
    let ranges = CdnRanges::builtin().unwrap();
    assert!(ranges.controls_ip(Cdn::Cloudflare, ip("104.16.1.1")));
    assert!(ranges.controls_ip(Cdn::Cloudflare, ip("2606:4700::1111")));
    assert!(!ranges.controls_ip(Cdn::Cloudflare, ip("185.199.108.153")));
    assert!(!ranges.controls_ip(Cdn::Cloudflare, ip("151.101.1.1")));
}

#[test]
fn test_fastly_ownership() {
    let ranges = CdnRanges::builtin().unwrap();
    assert!(ranges.controls_ip(Cdn::Fastly, ip("151.101.65.195")));
    assert!(ranges.controls_ip(Cdn::Fastly, ip("2a04:4e42::1")));
    assert!(!ranges.controls_ip(Cdn::Fastly, ip("104.16.1.1")));
}

#[test]
fn test_parse_skips_comments_and_blank_lines() {
    let ranges = IpRanges::parse("# header\n\n10.0.0.0/8  # private\n192.0.2.7\n").unwrap();
    assert_eq!(ranges.len(), 2);
    assert!(ranges.contains(ip("10.1.2.3")));
    assert!(ranges.contains(ip("192.0.2.7")));
    assert!(!ranges.contains(ip("192.0.2.8")));
}

#[test]
fn test_parse_reports_line_of_bad_range() {
    let err = IpRanges::parse("10.0.0.0/8\nnot-a-range\n").unwrap_err();
    match err {
        CdnRangeError::InvalidRange { line, value } => {
            assert_eq!(line, 2);
            assert_eq!(value, "not-a-range");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_replaces_builtin_list() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "192.0.2.0/24").unwrap();

    let ranges = CdnRanges::load(Some(file.path()), None).unwrap();
    assert!(ranges.controls_ip(Cdn::Cloudflare, ip("192.0.2.10")));
    assert!(!ranges.controls_ip(Cdn::Cloudflare, ip("104.16.1.1")));
    assert!(ranges.controls_ip(Cdn::Fastly, ip("151.101.1.1")));
}

#[test]
fn test_load_missing_file() {
    let err = IpRanges::load(Path::new("/nonexistent/ranges.txt")).unwrap_err();
    assert!(matches!(err, CdnRangeError::Io { .. }));
}
