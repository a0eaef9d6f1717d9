use super::record::{RRset, RecordType, qualify_name};
use super::{constants, zone_fqdn};
use crate::error::{Result, SyncError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Output of one parse pass over a zone file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedZone {
    /// Domain without the trailing dot, as used in API paths
    pub domain: String,
    /// RRsets in first-seen order, one per (name, type)
    pub rrsets: Vec<RRset>,
    /// A parenthesized SOA block was present in the file
    pub soa_provided: bool,
    /// At least one NS line was accepted
    pub ns_present: bool,
}

impl ParsedZone {
    pub fn fqdn(&self) -> String {
        zone_fqdn(&self.domain)
    }

    pub fn has_rrset(&self, name: &str, rtype: RecordType) -> bool {
        self.rrsets
            .iter()
            .any(|rrset| rrset.name == name && rrset.rtype == rtype)
    }
}

/// Line-oriented zone file compiler
///
/// Only the subset of the master file format that hand-maintained
/// `<domain>.db` files use is understood: one record per line with an explicit
/// `IN` class token, plus an opaque parenthesized SOA block. Everything else
/// is skipped rather than rejected.
#[derive(Debug, Clone)]
pub struct ZoneFileParser {
    /// TTL used until the first explicit TTL is seen
    default_ttl: u32,
}

impl ZoneFileParser {
    pub fn new(default_ttl: u32) -> Self {
        Self { default_ttl }
    }

    /// Read and parse `<domain>.db`
    pub fn parse_file<P: AsRef<Path>>(&self, path: P, zone_exists: bool) -> Result<ParsedZone> {
        let path = path.as_ref();
        let domain = domain_from_path(path)?;

        let contents = fs::read_to_string(path)
            .map_err(|e| SyncError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        if contents.len() > constants::MAX_ZONE_FILE_SIZE {
            return Err(SyncError::InvalidZoneFile(format!(
                "{} exceeds maximum size",
                path.display()
            )));
        }

        Ok(self.parse(&domain, &contents, zone_exists))
    }

    /// Parse zone file contents for `domain`
    ///
    /// With `zone_exists` set, SOA blocks and NS/SOA lines are dropped so the
    /// apex already held by the control plane stays authoritative.
    pub fn parse(&self, domain: &str, contents: &str, zone_exists: bool) -> ParsedZone {
        let fqdn = zone_fqdn(domain);

        let mut rrsets: Vec<RRset> = Vec::new();
        let mut index: HashMap<(String, RecordType), usize> = HashMap::new();
        let mut last_ttl = self.default_ttl;
        let mut soa_provided = false;
        let mut ns_present = false;
        let mut in_soa_block = false;

        for (line_number, line) in contents.lines().enumerate() {
            let line_number = line_number + 1;

            if line.starts_with(';') || line.trim().is_empty() {
                continue;
            }

            if in_soa_block {
                if line.contains(')') {
                    in_soa_block = false;
                }
                continue;
            }

            // The block runs until a later line closes it, even when the
            // header already carries the ')'
            if is_soa_block_start(line) {
                soa_provided = true;
                in_soa_block = true;
                trace!(
                    "Line {}: SOA block {}",
                    line_number,
                    if zone_exists { "dropped" } else { "noted" }
                );
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                trace!("Line {}: too few fields, skipped", line_number);
                continue;
            }

            let in_index = match parts.iter().position(|p| *p == "IN") {
                Some(i) if i > 0 => i,
                _ => {
                    trace!("Line {}: no IN class token, skipped", line_number);
                    continue;
                }
            };

            // Carried TTL moves even when the line is skipped below
            let ttl = match parse_ttl(parts[in_index - 1]) {
                Some(ttl) => {
                    last_ttl = ttl;
                    ttl
                }
                None => last_ttl,
            };

            let Some(type_token) = parts.get(in_index + 1) else {
                continue;
            };

            let rtype = match type_token.parse::<RecordType>() {
                Ok(rtype) => rtype,
                Err(_) => {
                    trace!(
                        "Line {}: unsupported type {}, skipped",
                        line_number, type_token
                    );
                    continue;
                }
            };

            if zone_exists && rtype.is_apex_only() {
                continue;
            }

            let content = parts[in_index + 2..].join(" ");
            if content.is_empty() {
                trace!("Line {}: missing record data, skipped", line_number);
                continue;
            }

            if rtype == RecordType::NS {
                ns_present = true;
            }

            let name = qualify_name(parts[0], &fqdn);
            match index.get(&(name.clone(), rtype)) {
                Some(&i) => rrsets[i].push(content),
                None => {
                    index.insert((name.clone(), rtype), rrsets.len());
                    rrsets.push(RRset::new(name, rtype, ttl).with_record(content));
                }
            }
        }

        debug!(
            "Parsed zone {} with {} RRsets (soa_provided={}, ns_present={})",
            fqdn,
            rrsets.len(),
            soa_provided,
            ns_present
        );

        ParsedZone {
            domain: domain.to_string(),
            rrsets,
            soa_provided,
            ns_present,
        }
    }
}

impl Default for ZoneFileParser {
    fn default() -> Self {
        Self::new(constants::DEFAULT_TTL)
    }
}

/// Derive the domain from a `<domain>.db` path
pub fn domain_from_path(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SyncError::InvalidZoneFile(format!("No file name in {}", path.display())))?;

    match file_name.strip_suffix(constants::ZONE_FILE_SUFFIX) {
        Some(domain) if !domain.is_empty() => Ok(domain.to_string()),
        _ => Err(SyncError::InvalidZoneFile(format!(
            "{} is not a {} zone file",
            file_name,
            constants::ZONE_FILE_SUFFIX
        ))),
    }
}

/// Header of a multi-line SOA block
fn is_soa_block_start(line: &str) -> bool {
    line.contains("SOA") && line.contains('(')
}

/// Plain positive decimal seconds; unit suffixes are not recognised
fn parse_ttl(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u32>().ok().filter(|ttl| *ttl > 0)
}
