use crate::{env_flag, ConfigError, FromEnv};

/// Toggle for the audit trail emitted around product mutations.
///
/// Read once at startup and copied into every request context, so flipping
/// the variable requires a restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditConfig {
    pub enabled: bool,
}

impl FromEnv for AuditConfig {
    /// `AUDIT_LOG_ENABLED` defaults to off.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: env_flag("AUDIT_LOG_ENABLED", false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_disabled_by_default() {
        temp_env::with_var_unset("AUDIT_LOG_ENABLED", || {
            let config = AuditConfig::from_env().unwrap();
            assert!(!config.enabled);
        });
    }

    #[test]
    fn test_audit_enabled() {
        temp_env::with_var("AUDIT_LOG_ENABLED", Some("true"), || {
            assert!(AuditConfig::from_env().unwrap().enabled);
        });
    }

    #[test]
    fn test_audit_invalid_value() {
        temp_env::with_var("AUDIT_LOG_ENABLED", Some("sometimes"), || {
            let err = AuditConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("AUDIT_LOG_ENABLED"));
        });
    }
}
