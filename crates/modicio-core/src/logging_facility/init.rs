//! Subscriber installation

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile of the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines, `modicio=debug`
    Development,
    /// JSON lines, `modicio=info`
    Production,
    /// Bare registry; tests attach `TestCaptureLayer` instead
    Test,
}

impl Profile {
    /// Map a `--log-format` value (`pretty` or `json`) to a profile
    pub fn from_format(format: &str) -> Option<Self> {
        match format.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Profile::Development),
            "json" => Some(Profile::Production),
            _ => None,
        }
    }

    fn default_directive(&self) -> &'static str {
        match self {
            Profile::Development => "modicio=debug",
            Profile::Production | Profile::Test => "modicio=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global tracing subscriber for `profile`.
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()))
        };
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter())
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Test => {
                tracing_subscriber::registry().init();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_format() {
        assert_eq!(Profile::from_format("JSON"), Some(Profile::Production));
        assert_eq!(Profile::from_format("pretty"), Some(Profile::Development));
        assert_eq!(Profile::from_format("xml"), None);
    }

    #[test]
    fn test_default_directives_target_workspace() {
        assert!(Profile::Development.default_directive().starts_with("modicio"));
        assert!(Profile::Production.default_directive().ends_with("info"));
    }
}
