//! Background audit pipeline
//!
//! One accepted request becomes one spawned task that runs the audit to
//! completion and then makes exactly one terminal delivery. Nothing is shared
//! between concurrent runs apart from the immutable auditor and reporter.

use crate::audit::{AuditReport, Auditor};
use crate::delivery::{DeliveryOutcome, DeliveryReporter, DeliveryTarget};
use crate::AuditError;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use url::Url;

/// How far an audit reaches beyond the submitted URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditScope {
    /// Audit exactly the submitted pages
    Page,
    /// Crawl the site behind each submitted URL and audit one page per template
    Site,
}

impl AuditScope {
    /// Scope used when the caller did not choose one
    pub fn infer(target_count: usize) -> Self {
        if target_count > 1 {
            Self::Site
        } else {
            Self::Page
        }
    }
}

/// An accepted audit request
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// JSON-RPC id of the submitting call
    pub request_id: Value,
    pub task_id: String,
    pub context_id: String,
    pub user_id: Option<String>,
    pub targets: Vec<Url>,
    pub scope: AuditScope,
    pub webhook_url: String,
    pub credential: String,
}

impl AuditRequest {
    pub fn delivery_target(&self) -> DeliveryTarget {
        DeliveryTarget {
            request_id: self.request_id.clone(),
            task_id: self.task_id.clone(),
            context_id: self.context_id.clone(),
            webhook_url: self.webhook_url.clone(),
            credential: self.credential.clone(),
        }
    }
}

/// Runs the audit for `targets` without delivering anything
///
/// - `Page` scope with one target audits that page; an unreachable page is an
///   [`AuditError::Unreachable`].
/// - `Page` scope with several targets audits them as a site without crawling.
/// - `Site` scope crawls from every target first.
pub async fn execute(
    auditor: &Auditor,
    scope: AuditScope,
    targets: &[Url],
    credential: &str,
) -> Result<AuditReport, AuditError> {
    match (scope, targets) {
        (_, []) => Err(AuditError::NothingAudited),
        (AuditScope::Page, [target]) => auditor
            .audit_page(target, credential)
            .await?
            .ok_or_else(|| AuditError::Unreachable {
                url: target.to_string(),
            }),
        (AuditScope::Page, targets) => auditor.audit_site(targets, credential).await,
        (AuditScope::Site, targets) => {
            let candidates = auditor.discover_candidates(targets).await;
            if candidates.is_empty() {
                return Err(AuditError::Unreachable {
                    url: targets[0].to_string(),
                });
            }
            auditor.audit_site(&candidates, credential).await
        }
    }
}

/// Runs one request to completion and delivers its outcome once
///
/// Returns the outcome that was delivered (or attempted, if the webhook
/// could not be reached).
pub async fn run_audit(
    auditor: &Auditor,
    reporter: &DeliveryReporter,
    request: AuditRequest,
) -> DeliveryOutcome {
    tracing::info!(
        targets = request.targets.len(),
        scope = ?request.scope,
        user_id = request.user_id.as_deref().unwrap_or("-"),
        "Starting audit"
    );

    let outcome = match execute(auditor, request.scope, &request.targets, &request.credential).await
    {
        Ok(report) => {
            tracing::info!(report_len = report.text.len(), "Audit completed");
            DeliveryOutcome::Completed {
                report: report.text,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Audit failed");
            DeliveryOutcome::Failed {
                message: e.to_string(),
            }
        }
    };

    // One attempt only; the caller learns nothing more about this task
    if let Err(e) = reporter
        .deliver(&request.delivery_target(), outcome.clone())
        .await
    {
        tracing::error!(
            task_id = %request.task_id,
            webhook = %request.webhook_url,
            error = %e,
            "Terminal delivery failed"
        );
    }

    outcome
}

/// Spawns [`run_audit`] on the runtime and returns immediately
pub fn spawn_audit(
    auditor: Arc<Auditor>,
    reporter: Arc<DeliveryReporter>,
    request: AuditRequest,
) -> JoinHandle<DeliveryOutcome> {
    let span = tracing::info_span!("audit", task_id = %request.task_id);
    tokio::spawn(
        async move { run_audit(&auditor, &reporter, request).await }.instrument(span),
    )
}
