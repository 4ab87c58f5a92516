//! Contact condition settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default scale of the active-set distance tolerance.
pub const DEFAULT_ACTIVE_CHECK_FACTOR: f64 = 0.005;

/// Settings shared by the mortar contact conditions of a contact interface.
///
/// ```
/// use mortar_core::config::ContactSettings;
///
/// let settings = ContactSettings {
///     integration_order: Some(3),
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSettings {
    /// Scale of the active-set tolerance τ = factor × max(slave length, master length).
    #[serde(default = "default_active_check_factor")]
    pub active_check_factor: f64,

    /// Gauss integration order on the slave segment (1 to 5). `None` uses the
    /// geometry default.
    #[serde(default)]
    pub integration_order: Option<u32>,
}

fn default_active_check_factor() -> f64 { DEFAULT_ACTIVE_CHECK_FACTOR }

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            active_check_factor: default_active_check_factor(),
            integration_order: None,
        }
    }
}

impl ContactSettings {
    /// Check the settings.
    ///
    /// An out-of-range integration order is accepted here: the condition
    /// falls back to the geometry default when it is initialized.
    pub fn validate(&self) -> Result<()> {
        if !self.active_check_factor.is_finite() || self.active_check_factor < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "active_check_factor must be finite and non-negative, got {}",
                self.active_check_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ContactSettings::default();
        assert_eq!(settings.active_check_factor, 0.005);
        assert_eq!(settings.integration_order, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let settings: ContactSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ContactSettings::default());

        let settings: ContactSettings =
            serde_json::from_str(r#"{"active_check_factor": 0.01, "integration_order": 4}"#)
                .unwrap();
        assert_eq!(settings.active_check_factor, 0.01);
        assert_eq!(settings.integration_order, Some(4));
    }

    #[test]
    fn test_validate_rejects_bad_factor() {
        for factor in [-1.0, f64::NAN, f64::INFINITY] {
            let settings = ContactSettings {
                active_check_factor: factor,
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(Error::InvalidConfiguration(_))
            ));
        }
    }
}
