//! Logging initialization

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output, debug level
    Development,
    /// JSON output, info level
    Production,
    /// Bare registry; tests install a capture layer via `init_test_capture()`
    Test,
}

impl Profile {
    fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "orgtree_core=debug",
            Profile::Production | Profile::Test => "orgtree_core=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter. If another subscriber is already installed the call
/// leaves it in place.
///
/// # Example
///
/// ```
/// use orgtree_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));
        let result = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        if let Err(e) = result {
            tracing::debug!("logging already initialized: {}", e);
        }
    });
}
