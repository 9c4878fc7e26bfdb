#![forbid(unsafe_code)]

//! Tracker configuration.
//!
//! Every field has a default matching the landing page markup, so an empty
//! JSON object (or no config at all) produces the stock behavior. Field
//! names are camelCase because the usual source is a JS host:
//!
//! ```json
//! { "directional": false, "resizeQuietMs": 200 }
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Hard upper bound on either delay, in milliseconds.
const MAX_DELAY_MS: u64 = 10_000;
/// Hard upper bound on `activation_frames`.
const MAX_ACTIVATION_FRAMES: u8 = 8;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How navigation entries are decorated when the active section changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPolicy {
    /// Only `active` is written.
    Simple,
    /// Entries before/after the active one also get directional classes,
    /// and every entry carries a transitioning marker while it settles.
    Directional,
}

/// CSS class names written by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavClassNames {
    pub active: String,
    pub before_active: String,
    pub after_active: String,
    pub transitioning: String,
}

impl Default for NavClassNames {
    fn default() -> Self {
        Self {
            active: "active".to_owned(),
            before_active: "before-active".to_owned(),
            after_active: "after-active".to_owned(),
            transitioning: "nav-transitioning".to_owned(),
        }
    }
}

impl NavClassNames {
    /// Name configured for `class`.
    #[must_use]
    pub fn name(&self, class: crate::NavClass) -> &str {
        match class {
            crate::NavClass::Active => &self.active,
            crate::NavClass::BeforeActive => &self.before_active,
            crate::NavClass::AfterActive => &self.after_active,
            crate::NavClass::Transitioning => &self.transitioning,
        }
    }
}

/// Full tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Use the directional policy (`true`) or the simple one (`false`).
    pub directional: bool,
    /// Quiet period before a burst of resize events triggers a recompute.
    pub resize_quiet_ms: u64,
    /// Time after activation before `nav-transitioning` is removed.
    pub settle_delay_ms: u64,
    /// Frame ticks between the class reset and adding `active`.
    pub activation_frames: u8,
    /// Selector for trackable sections, in document order.
    pub section_selector: String,
    /// Selector for navigation entries, in navigation order.
    pub nav_selector: String,
    /// Attribute on a nav entry naming its bound section id.
    pub section_attribute: String,
    pub classes: NavClassNames,
    /// Maximum log level for the console subscriber.
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            directional: true,
            resize_quiet_ms: 150,
            settle_delay_ms: 400,
            activation_frames: 2,
            section_selector: "main section[id]".to_owned(),
            nav_selector: ".nav-link".to_owned(),
            section_attribute: "data-section".to_owned(),
            classes: NavClassNames::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl TrackerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Shorthand for a default config with the simple policy.
    #[must_use]
    pub fn simple() -> Self {
        Self {
            directional: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn policy(&self) -> NavPolicy {
        if self.directional {
            NavPolicy::Directional
        } else {
            NavPolicy::Simple
        }
    }

    #[must_use]
    pub const fn resize_quiet(&self) -> Duration {
        Duration::from_millis(self.resize_quiet_ms)
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Check every parameter, collecting all problems.
    ///
    /// An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("sectionSelector", &self.section_selector),
            ("navSelector", &self.nav_selector),
            ("sectionAttribute", &self.section_attribute),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{field} must not be empty"));
            }
        }

        let names = [
            ("classes.active", &self.classes.active),
            ("classes.beforeActive", &self.classes.before_active),
            ("classes.afterActive", &self.classes.after_active),
            ("classes.transitioning", &self.classes.transitioning),
        ];
        for (field, value) in names {
            if value.is_empty() {
                errors.push(format!("{field} must not be empty"));
            } else if value.chars().any(char::is_whitespace) {
                errors.push(format!("{field} must not contain whitespace: {value:?}"));
            }
        }
        for (i, (a_field, a)) in names.iter().enumerate() {
            for (b_field, b) in &names[i + 1..] {
                if !a.is_empty() && a == b {
                    errors.push(format!("{a_field} and {b_field} share the class {a:?}"));
                }
            }
        }

        if self.activation_frames == 0 || self.activation_frames > MAX_ACTIVATION_FRAMES {
            errors.push(format!(
                "activationFrames must be in 1..={MAX_ACTIVATION_FRAMES}, got {}",
                self.activation_frames
            ));
        }
        if self.resize_quiet_ms > MAX_DELAY_MS {
            errors.push(format!(
                "resizeQuietMs must be at most {MAX_DELAY_MS}, got {}",
                self.resize_quiet_ms
            ));
        }
        if self.settle_delay_ms > MAX_DELAY_MS {
            errors.push(format!(
                "settleDelayMs must be at most {MAX_DELAY_MS}, got {}",
                self.settle_delay_ms
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "logLevel must be one of {}, got {:?}",
                LOG_LEVELS.join("|"),
                self.log_level
            ));
        }

        errors
    }

    /// Return `self` if valid, otherwise every validation error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`TrackerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
