//! Application configuration loaded from environment variables.
//!
//! Firebase credentials can be embedded at build time through the same
//! variable names; values present at run time win.

use std::env;
use std::time::Duration;

const EMBEDDED_API_KEY: Option<&str> = option_env!("FIREBASE_API_KEY");
const EMBEDDED_PROJECT_ID: Option<&str> = option_env!("FIREBASE_PROJECT_ID");

/// Which backend the adapters talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Firestore,
}

#[derive(Debug, Clone)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub project_id: String,
    /// Host running the local emulator suite, e.g. `localhost`.
    pub emulator_host: Option<String>,
}

impl FirebaseSettings {
    /// Firestore and Identity Toolkit base URLs on the emulator host, using
    /// the emulator suite's default ports.
    pub fn emulator_endpoints(&self) -> Option<(String, String)> {
        self.emulator_host.as_deref().map(|host| {
            (
                format!("http://{host}:8080/v1"),
                format!("http://{host}:9099/identitytoolkit.googleapis.com/v1"),
            )
        })
    }
}

/// Page sizes used by the browse screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseLimits {
    pub initial: usize,
    /// Bound for the unfiltered "All" category.
    pub all: usize,
}

impl Default for BrowseLimits {
    fn default() -> Self {
        Self {
            initial: 10,
            all: 20,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub firebase: Option<FirebaseSettings>,
    pub poll_interval: Duration,
    pub browse: BrowseLimits,
    /// Account the development consent screen approves as, if any.
    pub dev_federated_email: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            firebase: None,
            poll_interval: Duration::from_millis(2000),
            browse: BrowseLimits::default(),
            dev_federated_email: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let backend = match env::var("RECIPE_BACKEND")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Ok("firestore") => BackendKind::Firestore,
            Ok("memory") | Err(_) => BackendKind::Memory,
            Ok(other) => {
                tracing::warn!(backend = %other, "Unknown RECIPE_BACKEND, using memory");
                BackendKind::Memory
            }
        };

        let api_key = env::var("FIREBASE_API_KEY")
            .ok()
            .or_else(|| EMBEDDED_API_KEY.map(str::to_string))
            .filter(|v| !v.is_empty());
        let project_id = env::var("FIREBASE_PROJECT_ID")
            .ok()
            .or_else(|| EMBEDDED_PROJECT_ID.map(str::to_string))
            .filter(|v| !v.is_empty());
        let firebase = match (api_key, project_id) {
            (Some(api_key), Some(project_id)) => Some(FirebaseSettings {
                api_key,
                project_id,
                emulator_host: env::var("FIREBASE_EMULATOR_HOST")
                    .ok()
                    .filter(|v| !v.is_empty()),
            }),
            _ => None,
        };

        let defaults = Self::default();
        Self {
            backend,
            firebase,
            poll_interval: env::var("FIRESTORE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            browse: BrowseLimits {
                initial: env::var("BROWSE_INITIAL_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.browse.initial),
                all: env::var("BROWSE_ALL_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.browse.all),
            },
            dev_federated_email: env::var("DEV_FEDERATED_EMAIL")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}
