use super::parser::ParsedZone;
use super::record::{RRset, RecordType};
use crate::config::{SoaTimers, SyncConfig};
use tracing::debug;

/// Apex records injected when a zone is created from a file that lacks them
#[derive(Debug, Clone)]
pub struct DefaultPolicy {
    primary_nameserver: String,
    nameservers: Vec<String>,
    soa_ttl: u32,
    ns_ttl: u32,
    soa: SoaTimers,
}

impl DefaultPolicy {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            primary_nameserver: config.primary_nameserver.clone(),
            nameservers: config.nameservers.clone(),
            soa_ttl: config.default_ttl,
            ns_ttl: config.ns_ttl,
            soa: config.soa,
        }
    }

    /// Final RRset list for a zone: parsed RRsets, then a synthesized SOA,
    /// then a synthesized NS RRset. Existing zones get nothing added.
    ///
    /// An SOA supplied as a parenthesized block is never parsed, so a new
    /// zone always ends up with the synthesized SOA unless the file carried a
    /// single-line SOA record.
    pub fn apply(&self, parsed: ParsedZone, zone_exists: bool) -> Vec<RRset> {
        if zone_exists {
            return parsed.rrsets;
        }

        let fqdn = parsed.fqdn();
        let needs_soa = !parsed.has_rrset(&fqdn, RecordType::SOA);
        let needs_ns = !parsed.ns_present;
        let mut rrsets = parsed.rrsets;

        if needs_soa {
            debug!("Synthesizing SOA for {}", fqdn);
            rrsets.push(self.soa_rrset(&fqdn));
        }

        if needs_ns {
            debug!("Synthesizing NS RRset for {}", fqdn);
            rrsets.push(self.ns_rrset(&fqdn));
        }

        rrsets
    }

    fn soa_rrset(&self, fqdn: &str) -> RRset {
        let content = format!(
            "{} hostmaster.{} {} {} {} {} {}",
            self.primary_nameserver,
            fqdn,
            self.soa.serial,
            self.soa.refresh,
            self.soa.retry,
            self.soa.expire,
            self.soa.minimum
        );
        RRset::new(fqdn, RecordType::SOA, self.soa_ttl).with_record(content)
    }

    fn ns_rrset(&self, fqdn: &str) -> RRset {
        let mut rrset = RRset::new(fqdn, RecordType::NS, self.ns_ttl);
        for ns in &self.nameservers {
            rrset.push(ns.clone());
        }
        rrset
    }
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
