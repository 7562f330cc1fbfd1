use std::time::Duration;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase project settings.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    /// How often live queries re-run against the REST API.
    pub poll_interval: Duration,
    pub firestore_url: String,
    pub identity_toolkit_url: String,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            poll_interval: Duration::from_secs(2),
            firestore_url: FIRESTORE_URL.to_string(),
            identity_toolkit_url: IDENTITY_TOOLKIT_URL.to_string(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Point both APIs at another host, e.g. the local emulator suite.
    pub fn with_endpoints(
        mut self,
        firestore_url: impl Into<String>,
        identity_toolkit_url: impl Into<String>,
    ) -> Self {
        self.firestore_url = firestore_url.into();
        self.identity_toolkit_url = identity_toolkit_url.into();
        self
    }

    /// Resource name prefix for documents, e.g. `projects/p/databases/(default)/documents`.
    pub fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root())
    }

    pub fn documents_url(&self) -> String {
        format!("{}/{}", self.firestore_url, self.documents_root())
    }

    pub fn identity_url(&self, method: &str) -> String {
        format!("{}/accounts:{method}", self.identity_toolkit_url)
    }
}
