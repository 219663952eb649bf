//! Lambda entrypoint.
//!
//! The binary initialises logging, discovers which environment it is running
//! in, loads AWS configuration, and then hands execution to `lambda_http`.
//! Each invocation reuses the `AppContext` for the Secrets Manager client and
//! configuration; the database secret itself is re-read per invocation so
//! credential rotations take effect without a cold start.

use std::sync::Arc;

use lambda_docdb_crud::{handle_request, runtime_env::DeploymentEnv, AppContext};
use lambda_http::{run, service_fn, Error as LambdaError};
use tracing::info;

const DEFAULT_DATABASE: &str = "mydb";
const DEFAULT_COLLECTION: &str = "mycollection";

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .json()
        .with_current_span(false)
        .init();

    let environment = DeploymentEnv::detect();
    info!(
        environment = environment.name(),
        resolution = %environment.source(),
        "initialising Lambda runtime"
    );

    let secret_name = std::env::var("DOCUMENT_SECRET_NAME")
        .map_err(|_| LambdaError::from("missing DOCUMENT_SECRET_NAME env var"))?;
    let database =
        std::env::var("DOCDB_DATABASE_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_owned());
    let collection =
        std::env::var("DOCDB_COLLECTION_NAME").unwrap_or_else(|_| DEFAULT_COLLECTION.to_owned());

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets = aws_sdk_secretsmanager::Client::new(&config);

    let ctx = Arc::new(AppContext::new(
        secrets,
        secret_name,
        database,
        collection,
        environment.connection_profile(),
    ));

    run(service_fn(move |event| {
        let ctx = ctx.clone();
        async move { handle_request(ctx, event).await }
    }))
    .await
}
