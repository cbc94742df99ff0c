//! Resolution request.

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// A request to resolve the environment of one application.
///
/// `profile` may name several profiles separated by commas; later profiles
/// take precedence over earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    application: String,
    profile: String,
    label: Option<String>,
}

impl ResolutionRequest {
    /// Build a request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `application` or `profile` is empty.
    pub fn new(
        application: impl Into<String>,
        profile: impl Into<String>,
        label: Option<String>,
    ) -> Result<Self> {
        let application = application.into();
        let profile = profile.into();

        if application.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "application",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if profiles_of(&profile).is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "profile",
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        let label = label
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.replace(constants::LABEL_SLASH_ESCAPE, "/"));

        Ok(Self {
            application,
            profile,
            label,
        })
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    /// The raw profile string as requested.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Individual profiles in request order.
    pub fn profiles(&self) -> Vec<&str> {
        profiles_of(&self.profile)
    }

    /// Requested label with `(_)` already expanded to `/`.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

fn profiles_of(profile: &str) -> Vec<&str> {
    profile
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
