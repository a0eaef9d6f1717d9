//! Control plane REST contract
//!
//! Request bodies follow the PowerDNS-style zones API:
//! `POST /servers/{id}/zones` creates a zone and
//! `PATCH /servers/{id}/zones/{domain}` applies RRset changes.

pub mod client;

use crate::error::Result;
use crate::zone::{RRset, Record, RecordType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::HttpTransport;

/// Marker the control plane puts in a 422 body when a name already holds
/// an incompatible RRset
pub const CONFLICT_SIGNATURE: &str = "Conflicts with pre-existing RRset";

/// Zone kind used for every created zone
pub const ZONE_KIND_NATIVE: &str = "Native";

/// Status and raw body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 422 carrying the pre-existing RRset rejection
    pub fn is_rrset_conflict(&self) -> bool {
        self.status == 422 && self.body.contains(CONFLICT_SIGNATURE)
    }
}

/// HTTP capability the reconciliation engine talks through
///
/// Paths are relative to the configured API base URL. Implementations add
/// the credential header and enforce request timeouts; a non-2xx status is
/// a normal `Ok` response, only failures to complete the exchange are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse>;

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse>;

    async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse>;
}

/// Builds resource paths for one server id
#[derive(Debug, Clone)]
pub struct Endpoints {
    server_id: String,
}

impl Endpoints {
    pub fn new(server_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
        }
    }

    pub fn zones(&self) -> String {
        format!("/servers/{}/zones", self.server_id)
    }

    pub fn zone(&self, domain: &str) -> String {
        format!("/servers/{}/zones/{}", self.server_id, domain)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new("localhost")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub kind: String,
    pub rrsets: Vec<RRset>,
}

impl CreateZoneRequest {
    pub fn native(fqdn: impl Into<String>, rrsets: Vec<RRset>) -> Self {
        Self {
            name: fqdn.into(),
            kind: ZONE_KIND_NATIVE.to_string(),
            rrsets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

/// One entry of a PATCH body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRsetChange {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    pub changetype: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
}

impl RRsetChange {
    pub fn replace(rrset: &RRset) -> Self {
        Self {
            name: rrset.name.clone(),
            rtype: rrset.rtype,
            ttl: Some(rrset.ttl),
            changetype: ChangeType::Replace,
            records: Some(rrset.records.clone()),
        }
    }

    pub fn delete(name: impl Into<String>, rtype: RecordType) -> Self {
        Self {
            name: name.into(),
            rtype,
            ttl: None,
            changetype: ChangeType::Delete,
            records: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchZoneRequest {
    pub rrsets: Vec<RRsetChange>,
}

impl PatchZoneRequest {
    /// Full replacement of every given RRset
    pub fn replace_all(rrsets: &[RRset]) -> Self {
        Self {
            rrsets: rrsets.iter().map(RRsetChange::replace).collect(),
        }
    }

    pub fn single(change: RRsetChange) -> Self {
        Self {
            rrsets: vec![change],
        }
    }
}
