use axum::{extract::FromRequestParts, http::request::Parts};
use axum_helpers::{AuditEvent, AuditOutcome, RequestIdentity};
use core_config::audit::AuditConfig;
use serde::Serialize;
use std::convert::Infallible;

use crate::handlers::ProductsState;
use crate::repository::ProductRepository;

/// Per-request facts the service needs besides its input: who is asking and
/// whether mutations should be audited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub audit_enabled: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(identity: RequestIdentity, audit: AuditConfig) -> Self {
        Self {
            user_id: identity.user_id,
            audit_enabled: audit.enabled,
            ip_address: identity.ip_address,
            user_agent: identity.user_agent,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Emit an audit event when auditing is on. Never fails.
    pub fn audit(
        &self,
        action: &str,
        resource: Option<String>,
        outcome: AuditOutcome,
        details: impl Serialize,
    ) {
        if !self.audit_enabled {
            return;
        }

        AuditEvent::new(self.user_id.clone(), action, resource, outcome)
            .with_ip(self.ip_address.clone())
            .with_user_agent(self.user_agent.clone())
            .with_details(details)
            .log();
    }
}

impl<R: ProductRepository> FromRequestParts<ProductsState<R>> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ProductsState<R>,
    ) -> Result<Self, Self::Rejection> {
        let identity = RequestIdentity::from_request_parts(parts, state).await?;
        Ok(Self::new(identity, state.audit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_from_identity() {
        let identity = RequestIdentity {
            user_id: Some("42".to_string()),
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: None,
        };

        let ctx = RequestContext::new(identity, AuditConfig { enabled: true });

        assert_eq!(ctx.user_id.as_deref(), Some("42"));
        assert!(ctx.audit_enabled);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_audit_is_a_no_op_when_disabled() {
        RequestContext::default().audit(
            "product.create",
            None,
            AuditOutcome::Requested,
            json!({ "name": "Widget" }),
        );
    }
}
