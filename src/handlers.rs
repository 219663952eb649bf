use std::{path::PathBuf, sync::Arc};

use futures::TryStreamExt;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error as LambdaError, Request, RequestExt, Response,
};
use mongodb::{
    bson::{doc, Bson, Document},
    options::{ClientOptions, Tls, TlsOptions},
    Client, Collection,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    context::AppContext,
    document::{id_filter, parse_body, split_id, ID_FIELD},
    error::{lambda_error, AppError},
    secret::resolve_connection_uri,
};

const CREDENTIAL_FAILURE_BODY: &str =
    "internal server error - failed to retrieve database credentials from the secret store.";
const DELETE_FAILURE_BODY: &str = "internal server error - failed to delete document.";
const UNSUPPORTED_METHOD_BODY: &str = "unsupported HTTP method.";

/// The operations this API exposes, mapped from the raw HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Replace,
    Delete,
    Unsupported,
}

impl Operation {
    /// Exact match on the four supported methods; everything else, including
    /// non-uppercase spellings, is `Unsupported`.
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET => Operation::List,
            Method::POST => Operation::Create,
            Method::PUT => Operation::Replace,
            Method::DELETE => Operation::Delete,
            _ => Operation::Unsupported,
        }
    }
}

/// Top-level request dispatcher used by the Lambda runtime.
///
/// Each invocation resolves the database secret, opens its own client, runs
/// exactly one operation, and shuts the client down again before returning,
/// whichever way dispatch went.
pub async fn handle_request(
    ctx: Arc<AppContext>,
    event: Request,
) -> Result<Response<Body>, LambdaError> {
    let Some(uri) = resolve_connection_uri(ctx.as_ref()).await else {
        return Ok(text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            CREDENTIAL_FAILURE_BODY,
        ));
    };

    let client = connect(ctx.as_ref(), &uri).await.map_err(lambda_error)?;
    let collection = client
        .database(ctx.database())
        .collection::<Document>(ctx.collection());

    let operation = Operation::from_method(event.method());
    info!(operation = ?operation, method = %event.method(), "dispatching request");

    let outcome = match operation {
        Operation::List => list_documents(&collection).await,
        Operation::Create => create_document(&event, &collection).await,
        Operation::Replace => replace_document(&event, &collection).await,
        Operation::Delete => delete_document(&event, &collection).await,
        Operation::Unsupported => {
            warn!(method = %event.method(), "unsupported HTTP method");
            Ok(text_response(StatusCode::BAD_REQUEST, UNSUPPORTED_METHOD_BODY))
        }
    };

    // The client must not outlive the invocation.
    client.shutdown().await;

    outcome.map_err(lambda_error)
}

async fn connect(ctx: &AppContext, uri: &str) -> Result<Client, AppError> {
    let mut options = ClientOptions::parse(uri)
        .await
        .map_err(|e| AppError::Database(format!("invalid connection string: {e}")))?;
    if let Some(bundle) = ctx.profile().ca_bundle() {
        let tls = TlsOptions::builder()
            .ca_file_path(PathBuf::from(bundle))
            .build();
        options.tls = Some(Tls::Enabled(tls));
    }
    Client::with_options(options)
        .map_err(|e| AppError::Database(format!("failed to initialise client: {e}")))
}

async fn list_documents(collection: &Collection<Document>) -> Result<Response<Body>, AppError> {
    let documents: Vec<Document> = collection
        .find(doc! {})
        .await
        .map_err(|e| AppError::Database(format!("find failed: {e}")))?
        .try_collect()
        .await
        .map_err(|e| AppError::Database(format!("cursor drain failed: {e}")))?;
    info!(count = documents.len(), "fetched documents");

    Ok(json_response(StatusCode::OK, &documents))
}

async fn create_document(
    event: &Request,
    collection: &Collection<Document>,
) -> Result<Response<Body>, AppError> {
    let payload = parse_body(request_body(event))?;
    let result = collection
        .insert_one(payload)
        .await
        .map_err(|e| AppError::Database(format!("insert failed: {e}")))?;
    info!(inserted_id = %result.inserted_id, "inserted document");

    Ok(json_response(
        StatusCode::CREATED,
        json!({ "insertedId": result.inserted_id }),
    ))
}

async fn replace_document(
    event: &Request,
    collection: &Collection<Document>,
) -> Result<Response<Body>, AppError> {
    let payload = parse_body(request_body(event))?;
    let (id, fields) = split_id(payload)?;
    let result = collection
        .update_one(id_filter(id), doc! { "$set": fields })
        .await
        .map_err(|e| AppError::Database(format!("update failed: {e}")))?;
    info!(
        matched = result.matched_count,
        modified = result.modified_count,
        "updated document"
    );

    // A filter that matched nothing still reports success; the zero counts in
    // the body are the caller's signal.
    Ok(json_response(
        StatusCode::OK,
        json!({
            "matchedCount": result.matched_count,
            "modifiedCount": result.modified_count,
            "upsertedId": result.upserted_id,
        }),
    ))
}

/// The one operation with local error recovery: every failure on this path
/// becomes a structured 500 instead of an invocation error.
async fn delete_document(
    event: &Request,
    collection: &Collection<Document>,
) -> Result<Response<Body>, AppError> {
    match try_delete(event, collection).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!(category = err.category(), error = %err, "failed to delete document");
            Ok(text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                DELETE_FAILURE_BODY,
            ))
        }
    }
}

async fn try_delete(
    event: &Request,
    collection: &Collection<Document>,
) -> Result<Response<Body>, AppError> {
    let id = match event
        .query_string_parameters_ref()
        .and_then(|qs| qs.first(ID_FIELD))
    {
        Some(id) => id.to_owned(),
        None => {
            return Err(AppError::Payload(format!(
                "`{ID_FIELD}` query parameter is required"
            )))
        }
    };

    let result = collection
        .delete_one(id_filter(Bson::String(id)))
        .await
        .map_err(|e| AppError::Database(format!("delete failed: {e}")))?;
    info!(deleted = result.deleted_count, "deleted document");

    Ok(json_response(
        StatusCode::OK,
        json!({ "deletedCount": result.deleted_count }),
    ))
}

fn request_body(event: &Request) -> Option<&str> {
    match event.body() {
        Body::Text(text) => Some(text.as_str()),
        Body::Binary(bytes) => std::str::from_utf8(bytes).ok(),
        Body::Empty => None,
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: T) -> Response<Body> {
    let body = serde_json::to_string(&value).unwrap_or_else(|_| "{}".into());
    log_response(status, &body);

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::Text(body))
        .expect("failed to build response")
}

fn text_response(status: StatusCode, message: &str) -> Response<Body> {
    log_response(status, message);

    Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(Body::Text(message.to_owned()))
        .expect("failed to build response")
}

fn log_response(status: StatusCode, body: &str) {
    if status.is_server_error() {
        error!(
            http_status = status.as_u16(),
            body = %body,
            "returning server error response"
        );
    } else if status.is_client_error() {
        warn!(
            http_status = status.as_u16(),
            body = %body,
            "returning client error response"
        );
    }
}
