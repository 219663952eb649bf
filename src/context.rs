//! Application-scoped context shared across request handlers.

use aws_sdk_secretsmanager::Client;

use crate::runtime_env::ConnectionProfile;

/// Holds the Secrets Manager client plus the configuration injected at
/// startup (secret name, target database and collection, connection profile).
#[derive(Clone)]
pub struct AppContext {
    secrets: Client,
    secret_name: String,
    database: String,
    collection: String,
    profile: ConnectionProfile,
}

impl AppContext {
    /// Construct a new context for the given Secrets Manager client and
    /// target database.
    pub fn new(
        secrets: Client,
        secret_name: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
        profile: ConnectionProfile,
    ) -> Self {
        Self {
            secrets,
            secret_name: secret_name.into(),
            database: database.into(),
            collection: collection.into(),
            profile,
        }
    }

    /// Borrow the underlying Secrets Manager client.
    pub fn secrets(&self) -> &Client {
        &self.secrets
    }

    /// Name of the secret holding the database credentials.
    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    /// Database the handler should operate on.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection the handler should operate on.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Environment-derived connection settings.
    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }
}
