//! Resolver-independent DNS record representation.
//!
//! Records are converted out of `hickory-resolver` types as soon as they are
//! received so the checks can be exercised against in-memory record sets.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_resolver::proto::rr::rdata::caa::Value as CaaValue;
use hickory_resolver::proto::rr::{RData, Record as HickoryRecord, RecordType};

/// A single resource record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Owner name, lowercase without the trailing dot
    pub name: String,
    pub data: RecordData,
}

/// Record payloads the checks look at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Mx { preference: u16, exchange: String },
    Ns(String),
    Soa { mname: String, rname: String, serial: u32 },
    Caa { critical: bool, tag: String, value: String },
}

/// Lowercases a DNS name and strips the root label.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

impl Record {
    pub fn new(name: &str, data: RecordData) -> Self {
        Self {
            name: normalize_name(name),
            data,
        }
    }

    pub fn a(name: &str, ip: Ipv4Addr) -> Self {
        Self::new(name, RecordData::A(ip))
    }

    pub fn aaaa(name: &str, ip: Ipv6Addr) -> Self {
        Self::new(name, RecordData::Aaaa(ip))
    }

    pub fn cname(name: &str, target: &str) -> Self {
        Self::new(name, RecordData::Cname(normalize_name(target)))
    }

    pub fn mx(name: &str, preference: u16, exchange: &str) -> Self {
        Self::new(
            name,
            RecordData::Mx {
                preference,
                exchange: normalize_name(exchange),
            },
        )
    }

    pub fn ns(name: &str, host: &str) -> Self {
        Self::new(name, RecordData::Ns(normalize_name(host)))
    }

    pub fn soa(name: &str, mname: &str, rname: &str, serial: u32) -> Self {
        Self::new(
            name,
            RecordData::Soa {
                mname: normalize_name(mname),
                rname: normalize_name(rname),
                serial,
            },
        )
    }

    pub fn caa(name: &str, tag: &str, value: &str) -> Self {
        Self::new(
            name,
            RecordData::Caa {
                critical: false,
                tag: tag.to_ascii_lowercase(),
                value: value.trim().to_string(),
            },
        )
    }

    pub fn record_type(&self) -> RecordType {
        match self.data {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Mx { .. } => RecordType::MX,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Soa { .. } => RecordType::SOA,
            RecordData::Caa { .. } => RecordType::CAA,
        }
    }

    /// The address carried by an A or AAAA record.
    pub fn address(&self) -> Option<IpAddr> {
        match self.data {
            RecordData::A(ip) => Some(IpAddr::V4(ip)),
            RecordData::Aaaa(ip) => Some(IpAddr::V6(ip)),
            _ => None,
        }
    }

    /// Whether the record is owned by `host` (case-insensitive, trailing dot ignored).
    pub fn is_owned_by(&self, host: &str) -> bool {
        self.name == normalize_name(host)
    }

    /// Converts a resolver record. Record types the checks never look at yield `None`.
    pub fn from_hickory(record: &HickoryRecord) -> Option<Self> {
        let name = record.name().to_utf8();
        let data = match record.data()? {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::Aaaa(aaaa.0),
            RData::CNAME(cname) => RecordData::Cname(normalize_name(&cname.0.to_utf8())),
            RData::NS(ns) => RecordData::Ns(normalize_name(&ns.0.to_utf8())),
            RData::MX(mx) => RecordData::Mx {
                preference: mx.preference(),
                exchange: normalize_name(&mx.exchange().to_utf8()),
            },
            RData::SOA(soa) => RecordData::Soa {
                mname: normalize_name(&soa.mname().to_utf8()),
                rname: normalize_name(&soa.rname().to_utf8()),
                serial: soa.serial(),
            },
            RData::CAA(caa) => RecordData::Caa {
                critical: caa.issuer_critical(),
                tag: caa.tag().as_str().to_ascii_lowercase(),
                value: match caa.value() {
                    CaaValue::Issuer(Some(issuer), _) => normalize_name(&issuer.to_utf8()),
                    CaaValue::Issuer(None, _) => String::new(),
                    CaaValue::Url(url) => url.to_string(),
                    CaaValue::Unknown(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                },
            },
            _ => return None,
        };
        Some(Self {
            name: normalize_name(&name),
            data,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. IN {} ", self.name, self.record_type())?;
        match &self.data {
            RecordData::A(ip) => write!(f, "{ip}"),
            RecordData::Aaaa(ip) => write!(f, "{ip}"),
            RecordData::Cname(target) | RecordData::Ns(target) => write!(f, "{target}."),
            RecordData::Mx {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}."),
            RecordData::Soa {
                mname,
                rname,
                serial,
            } => write!(f, "{mname}. {rname}. {serial}"),
            RecordData::Caa {
                critical,
                tag,
                value,
            } => write!(f, "{} {tag} \"{value}\"", if *critical { 128 } else { 0 }),
        }
    }
}
