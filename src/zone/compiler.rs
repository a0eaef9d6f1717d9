use super::defaults::DefaultPolicy;
use super::parser::ZoneFileParser;
use super::record::RRset;
use super::zone_fqdn;
use crate::api::{CreateZoneRequest, PatchZoneRequest};
use crate::config::SyncConfig;
use crate::error::Result;
use std::path::Path;

/// Parser plus default policy: turns a zone file into request bodies
#[derive(Debug, Clone)]
pub struct ZoneCompiler {
    parser: ZoneFileParser,
    defaults: DefaultPolicy,
}

impl ZoneCompiler {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            parser: ZoneFileParser::new(config.default_ttl),
            defaults: DefaultPolicy::new(config),
        }
    }

    /// RRsets to send for `path`, defaults included for new zones
    pub fn compile<P: AsRef<Path>>(&self, path: P, zone_exists: bool) -> Result<Vec<RRset>> {
        let parsed = self.parser.parse_file(path, zone_exists)?;
        Ok(self.defaults.apply(parsed, zone_exists))
    }

    /// POST body for a zone that does not exist yet
    pub fn create_request<P: AsRef<Path>>(&self, domain: &str, path: P) -> Result<CreateZoneRequest> {
        let rrsets = self.compile(path, false)?;
        Ok(CreateZoneRequest::native(zone_fqdn(domain), rrsets))
    }

    /// PATCH body for an existing zone, with the RRsets it was built from
    pub fn update_request<P: AsRef<Path>>(&self, path: P) -> Result<(Vec<RRset>, PatchZoneRequest)> {
        let rrsets = self.compile(path, true)?;
        let request = PatchZoneRequest::replace_all(&rrsets);
        Ok((rrsets, request))
    }
}

impl Default for ZoneCompiler {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
