use super::conflict::ConflictResolver;
use crate::api::{ApiResponse, Endpoints, Transport};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::zone::{RRset, ZoneCompiler, domain_from_path};
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

/// Step of the reconciliation state machine an event failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Creating,
    Updating,
    ConflictRetry,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Creating => "creating",
            Self::Updating => "updating",
            Self::ConflictRetry => "conflict retry",
        };
        f.write_str(name)
    }
}

/// Terminal state of one processed change event
///
/// Every variant except `Failed` is the `Done` state. HTTP error statuses
/// from the control plane are reported in `status`; they do not make an
/// event fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Zone was absent; POST issued
    Created { domain: String, status: u16 },
    /// Zone existed; PATCH issued without a conflict
    Updated { domain: String, status: u16 },
    /// PATCH hit a CNAME conflict; A RRsets deleted and PATCH retried once
    Recovered {
        domain: String,
        deleted: usize,
        status: u16,
    },
    Failed {
        domain: String,
        stage: Stage,
        reason: String,
    },
}

impl Outcome {
    pub fn domain(&self) -> &str {
        match self {
            Self::Created { domain, .. }
            | Self::Updated { domain, .. }
            | Self::Recovered { domain, .. }
            | Self::Failed { domain, .. } => domain,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { domain, status } => write!(f, "{}: created (HTTP {})", domain, status),
            Self::Updated { domain, status } => write!(f, "{}: updated (HTTP {})", domain, status),
            Self::Recovered {
                domain,
                deleted,
                status,
            } => write!(
                f,
                "{}: updated after removing {} conflicting A RRset(s) (HTTP {})",
                domain, deleted, status
            ),
            Self::Failed {
                domain,
                stage,
                reason,
            } => write!(f, "{}: failed while {}: {}", domain, stage, reason),
        }
    }
}

/// Pushes zone files to the control plane
///
/// Each call to [`process`](Self::process) runs independently: the zone's
/// existence is fetched once, then the zone is either created or fully
/// replaced. No state is carried between calls.
pub struct ReconciliationEngine<T: Transport> {
    transport: T,
    compiler: ZoneCompiler,
    endpoints: Endpoints,
    resolver: ConflictResolver,
}

impl<T: Transport> ReconciliationEngine<T> {
    pub fn new(config: &SyncConfig, transport: T) -> Self {
        let endpoints = Endpoints::new(config.server_id.clone());
        Self {
            transport,
            compiler: ZoneCompiler::new(config),
            resolver: ConflictResolver::new(endpoints.clone()),
            endpoints,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Reconcile one zone file; never returns an error, failures are logged
    /// and reported as `Outcome::Failed`
    pub async fn process<P: AsRef<Path>>(&self, path: P) -> Outcome {
        let path = path.as_ref();
        info!("Processing zone file: {}", path.display());

        let domain = match domain_from_path(path) {
            Ok(domain) => domain,
            Err(e) => return fail(&path.display().to_string(), Stage::Fetching, &e),
        };

        let url = self.endpoints.zone(&domain);
        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(e) => return fail(&domain, Stage::Fetching, &e),
        };
        info!(
            "GET request to {}. Response: {}, Body: {}",
            url, response.status, response.body
        );

        if response.status == 200 {
            self.update_zone(&domain, path).await
        } else {
            self.create_zone(&domain, path).await
        }
    }

    async fn create_zone(&self, domain: &str, path: &Path) -> Outcome {
        let request = match self.compiler.create_request(domain, path) {
            Ok(request) => request,
            Err(e) => return fail(domain, Stage::Creating, &e),
        };
        let body = match serde_json::to_value(&request) {
            Ok(body) => body,
            Err(e) => return fail(domain, Stage::Creating, &SyncError::from(e)),
        };

        let url = self.endpoints.zones();
        match self.transport.post(&url, &body).await {
            Ok(response) => {
                log_response("POST", &url, &response);
                Outcome::Created {
                    domain: domain.to_string(),
                    status: response.status,
                }
            }
            Err(e) => fail(domain, Stage::Creating, &e),
        }
    }

    async fn update_zone(&self, domain: &str, path: &Path) -> Outcome {
        let (rrsets, request) = match self.compiler.update_request(path) {
            Ok(built) => built,
            Err(e) => return fail(domain, Stage::Updating, &e),
        };
        let body = match serde_json::to_value(&request) {
            Ok(body) => body,
            Err(e) => return fail(domain, Stage::Updating, &SyncError::from(e)),
        };

        let url = self.endpoints.zone(domain);
        let response = match self.transport.patch(&url, &body).await {
            Ok(response) => response,
            Err(e) => return fail(domain, Stage::Updating, &e),
        };

        if response.is_rrset_conflict() {
            warn!(
                "PATCH request to {} conflicted with pre-existing RRset: {}",
                url, response.body
            );
            return self.retry_after_conflict(domain, &rrsets, &body).await;
        }

        log_response("PATCH", &url, &response);
        Outcome::Updated {
            domain: domain.to_string(),
            status: response.status,
        }
    }

    /// Remove A RRsets colliding with CNAMEs, then send the same PATCH once more
    async fn retry_after_conflict(
        &self,
        domain: &str,
        rrsets: &[RRset],
        body: &serde_json::Value,
    ) -> Outcome {
        let deleted = match self
            .resolver
            .resolve_all(&self.transport, domain, rrsets)
            .await
        {
            Ok(deleted) => deleted,
            Err(e) => return fail(domain, Stage::ConflictRetry, &e),
        };

        let url = self.endpoints.zone(domain);
        match self.transport.patch(&url, body).await {
            Ok(response) => {
                log_response("Retried PATCH", &url, &response);
                Outcome::Recovered {
                    domain: domain.to_string(),
                    deleted,
                    status: response.status,
                }
            }
            Err(e) => fail(domain, Stage::ConflictRetry, &e),
        }
    }
}

fn log_response(method: &str, url: &str, response: &ApiResponse) {
    if response.is_success() {
        info!(
            "{} request to {}. Response: {}, Body: {}",
            method, url, response.status, response.body
        );
    } else {
        warn!(
            "{} request to {}. Response: {}, Body: {}",
            method, url, response.status, response.body
        );
    }
}

fn fail(domain: &str, stage: Stage, err: &SyncError) -> Outcome {
    error!("Error processing zone {} ({}): {}", domain, stage, err);
    Outcome::Failed {
        domain: domain.to_string(),
        stage,
        reason: err.to_string(),
    }
}
