use std::{env, sync::Arc, time::Duration};

use anyhow::Result;
use aws_credential_types::Credentials;
use aws_sdk_secretsmanager::{config::Region, Client as SecretsClient, Config};
use lambda_docdb_crud::{AppContext, ConnectionProfile};
use lambda_http::Body;
use mongodb::{options::ClientOptions, Client as MongoClient};
use serde_json::json;
use uuid::Uuid;

pub const TEST_COLLECTION: &str = "items";

pub fn body_as_string(body: &Body) -> String {
    match body {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => String::new(),
    }
}

#[allow(dead_code)]
pub struct TestSetup {
    pub ctx: Arc<AppContext>,
    pub mongo: MongoClient,
    pub database: String,
    pub secret_name: String,
    _guard: CleanupGuard,
}

struct CleanupGuard {
    secrets: SecretsClient,
    secret_name: String,
    mongo: MongoClient,
    database: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let secrets = self.secrets.clone();
        let secret_name = self.secret_name.clone();
        let mongo = self.mongo.clone();
        let database = self.database.clone();
        tokio::spawn(async move {
            let _ = secrets
                .delete_secret()
                .secret_id(&secret_name)
                .force_delete_without_recovery(true)
                .send()
                .await;
            let _ = mongo.database(&database).drop().await;
        });
    }
}

/// Provision a throwaway secret and database for one test, or `None` when the
/// local Secrets Manager endpoint or MongoDB is unreachable.
pub async fn setup_environment() -> Option<TestSetup> {
    let secrets_endpoint = env::var("SECRETSMANAGER_ENDPOINT")
        .unwrap_or_else(|_| "http://127.0.0.1:4566".to_string());
    let mongo_host = env::var("MONGODB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mongo_port: u16 = env::var("MONGODB_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(27017);

    let region = Region::new(env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()));
    let config = Config::builder()
        .endpoint_url(secrets_endpoint)
        .region(region)
        .credentials_provider(Credentials::for_tests())
        .behavior_version_latest()
        .build();
    let secrets = SecretsClient::from_conf(config);

    if secrets.list_secrets().send().await.is_err() {
        eprintln!("skipping integration test: Secrets Manager not reachable");
        return None;
    }

    let mongo = match mongo_client(&mongo_host, mongo_port).await {
        Ok(client) => client,
        Err(_) => {
            eprintln!("skipping integration test: MongoDB not reachable");
            return None;
        }
    };

    let run_id = Uuid::new_v4().simple().to_string();
    let database = format!("itest_{run_id}");
    let secret_name = format!("docdb/IntegrationTest_{run_id}");
    secrets
        .create_secret()
        .name(&secret_name)
        .secret_string(
            json!({ "host": mongo_host, "port": mongo_port })
                .to_string(),
        )
        .send()
        .await
        .ok()?;

    let guard = CleanupGuard {
        secrets: secrets.clone(),
        secret_name: secret_name.clone(),
        mongo: mongo.clone(),
        database: database.clone(),
    };

    let ctx = Arc::new(AppContext::new(
        secrets,
        secret_name.clone(),
        database.clone(),
        TEST_COLLECTION,
        ConnectionProfile::local(),
    ));

    Some(TestSetup {
        ctx,
        mongo,
        database,
        secret_name,
        _guard: guard,
    })
}

async fn mongo_client(host: &str, port: u16) -> Result<MongoClient> {
    let mut options =
        ClientOptions::parse(format!("mongodb://{host}:{port}/?directConnection=true")).await?;
    options.server_selection_timeout = Some(Duration::from_secs(2));
    let client = MongoClient::with_options(options)?;
    client.list_database_names().await?;
    Ok(client)
}
