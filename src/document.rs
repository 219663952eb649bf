//! Helpers for the schemaless request payloads this API accepts.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};

use crate::error::AppError;

/// Identifier field shared by every operation.
pub const ID_FIELD: &str = "_id";

/// Parse an optional JSON request body into a BSON document. An absent or
/// blank body yields an empty document; malformed JSON is an error the caller
/// propagates.
pub fn parse_body(body: Option<&str>) -> Result<Document, AppError> {
    match body {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)
            .map_err(|e| AppError::Payload(format!("invalid JSON body: {e}"))),
        _ => Ok(Document::new()),
    }
}

/// Split the identifier out of a replace payload. The identifier must never
/// appear inside the `$set` document handed to the store.
pub fn split_id(mut payload: Document) -> Result<(Bson, Document), AppError> {
    let id = payload
        .remove(ID_FIELD)
        .ok_or_else(|| AppError::Payload(format!("payload is missing `{ID_FIELD}`")))?;
    Ok((id, payload))
}

/// Build an identifier filter. A string that parses as an ObjectId is matched
/// as one so identifiers generated by insert round-trip; anything else is
/// matched verbatim.
pub fn id_filter(id: Bson) -> Document {
    let id = match id {
        Bson::String(raw) => match ObjectId::parse_str(&raw) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(raw),
        },
        other => other,
    };
    doc! { ID_FIELD: id }
}
