use crate::api::{ApiResponse, Endpoints, PatchZoneRequest, RRsetChange, Transport};
use crate::error::Result;
use crate::zone::{RRset, RecordType};
use tracing::info;

/// Clears A RRsets that block CNAMEs from being written
///
/// Only the CNAME-vs-A collision is handled. The DELETE is sent without
/// checking whether an A RRset exists; deleting a missing RRset is a no-op on
/// the control plane.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    endpoints: Endpoints,
}

impl ConflictResolver {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    /// Delete the A RRset at the CNAME's owner name
    pub async fn resolve<T: Transport + ?Sized>(
        &self,
        transport: &T,
        domain: &str,
        cname: &RRset,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(PatchZoneRequest::single(RRsetChange::delete(
            cname.name.clone(),
            RecordType::A,
        )))?;

        let response = transport.patch(&self.endpoints.zone(domain), &body).await?;
        info!(
            "Removed conflicting A record for {}. Response: {}, Body: {}",
            cname.name, response.status, response.body
        );
        Ok(response)
    }

    /// Run `resolve` for every CNAME RRset in `rrsets`, in order
    ///
    /// Returns the number of DELETE requests sent.
    pub async fn resolve_all<T: Transport + ?Sized>(
        &self,
        transport: &T,
        domain: &str,
        rrsets: &[RRset],
    ) -> Result<usize> {
        let mut sent = 0;
        for cname in rrsets.iter().filter(|r| r.rtype == RecordType::CNAME) {
            self.resolve(transport, domain, cname).await?;
            sent += 1;
        }
        Ok(sent)
    }
}
