//! Attribution of platform events to the member who caused them.

use crate::gateway::{AuditKind, ModerationGateway};
use bastion_core::Snowflake;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Looks up who performed an action by reading the audit trail.
///
/// The trail is eventually consistent. Ban entries in particular can show up
/// after the ban event itself, so an empty ban lookup is retried once after
/// a short delay. Every other kind gets a single query.
pub struct AuditResolver {
    gateway: Arc<dyn ModerationGateway>,
    retry_delay: Duration,
    limit: u8,
}

impl AuditResolver {
    /// Create a resolver.
    pub fn new(gateway: Arc<dyn ModerationGateway>, retry_delay: Duration, limit: u8) -> Self {
        Self {
            gateway,
            retry_delay,
            limit,
        }
    }

    /// Executor of the newest `kind` entry targeting `target` within `window`.
    ///
    /// A failed trail query counts as "no evidence".
    #[instrument(skip(self), fields(guild = %guild, kind = %kind, target = %target))]
    pub async fn resolve_executor(
        &self,
        guild: &Snowflake,
        kind: AuditKind,
        target: &Snowflake,
        window: Duration,
    ) -> Option<Snowflake> {
        if kind != AuditKind::BanAdd {
            let executor = self.query(guild, kind, target, window).await;
            if executor.is_none() {
                debug!("No matching audit entry");
            }
            return executor;
        }

        let retry_strategy = FixedInterval::new(self.retry_delay).take(1);
        let executor = Retry::spawn(retry_strategy, || async move {
            match self.query(guild, kind, target, window).await {
                Some(executor) => Ok(executor),
                None => {
                    debug!(
                        delay_ms = self.retry_delay.as_millis() as u64,
                        "Ban entry not visible yet"
                    );
                    Err(RetryError::Transient {
                        err: (),
                        retry_after: None,
                    })
                }
            }
        })
        .await
        .ok();
        if executor.is_none() {
            debug!("No matching audit entry after retry");
        }
        executor
    }

    async fn query(
        &self,
        guild: &Snowflake,
        kind: AuditKind,
        target: &Snowflake,
        window: Duration,
    ) -> Option<Snowflake> {
        let entries = match self.gateway.audit_entries(guild, kind, self.limit).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Audit trail query failed");
                return None;
            }
        };

        let now = Utc::now();
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        entries
            .into_iter()
            .filter(|entry| entry.target().as_ref() == Some(target))
            .filter(|entry| now.signed_duration_since(*entry.created_at()) < window)
            .max_by_key(|entry| *entry.created_at())
            .and_then(|entry| entry.executor().clone())
    }
}
