use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record types the control plane accepts from zone files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    SOA,
    TXT,
    SRV,
    PTR,
    DKIM,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::MX => "MX",
            Self::NS => "NS",
            Self::SOA => "SOA",
            Self::TXT => "TXT",
            Self::SRV => "SRV",
            Self::PTR => "PTR",
            Self::DKIM => "DKIM",
        }
    }

    /// Types that belong to the zone apex and are left alone on existing zones
    pub fn is_apex_only(&self) -> bool {
        matches!(self, Self::NS | Self::SOA)
    }
}

impl FromStr for RecordType {
    type Err = String;

    // Zone files in the wild use upper-case mnemonics; anything else is skipped
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::AAAA),
            "CNAME" => Ok(Self::CNAME),
            "MX" => Ok(Self::MX),
            "NS" => Ok(Self::NS),
            "SOA" => Ok(Self::SOA),
            "TXT" => Ok(Self::TXT),
            "SRV" => Ok(Self::SRV),
            "PTR" => Ok(Self::PTR),
            "DKIM" => Ok(Self::DKIM),
            _ => Err(format!("Unsupported record type: {}", s)),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record inside an RRset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub content: String,
    pub disabled: bool,
}

impl Record {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: false,
        }
    }
}

/// Records sharing one owner name and type, managed as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRset {
    /// Fully qualified owner name, always ending in '.'
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: RecordType,
    pub ttl: u32,
    pub records: Vec<Record>,
}

impl RRset {
    pub fn new(name: impl Into<String>, rtype: RecordType, ttl: u32) -> Self {
        Self {
            name: name.into(),
            rtype,
            ttl,
            records: Vec::new(),
        }
    }

    pub fn with_record(mut self, content: impl Into<String>) -> Self {
        self.records.push(Record::new(content));
        self
    }

    pub fn push(&mut self, content: impl Into<String>) {
        self.records.push(Record::new(content));
    }

    pub fn key(&self) -> (&str, RecordType) {
        (self.name.as_str(), self.rtype)
    }
}

/// Turn a zone-file owner name into an FQDN relative to `zone_fqdn`
pub fn qualify_name(name: &str, zone_fqdn: &str) -> String {
    if name == "@" {
        zone_fqdn.to_string()
    } else if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.{}", name, zone_fqdn)
    }
}
