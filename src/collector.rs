//! Validation and persistence of a single email submission.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    model::{
        StoreError, SubscriberDraft, SubscriberMetadata, SubscriberRecord, SubscriberStore,
        ValidationErrors,
    },
    utils,
};

// ###################################
// ->   STRUCTS
// ###################################
/// The submitted JSON body. Every field may be missing, `submit` decides what is required.
/// Scalar values are taken as their string form, so `{"pageUrl": 5}` stores `"5"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub page_url: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub referrer: Option<String>,
}

/// `null` is treated as absent. Objects and arrays are rejected.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) => Err(de::Error::invalid_type(de::Unexpected::Seq, &"a scalar")),
        Value::Object(_) => Err(de::Error::invalid_type(de::Unexpected::Map, &"a scalar")),
    }
}

/// Information about the caller that the caller does not put in the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

// ###################################
// ->   SUBMIT
// ###################################
/// Validates the submission, enriches it with the request context and stores it as a new record.
///
/// Exactly one insert is attempted when both `email` and `source` are present and non-empty.
#[tracing::instrument(name = "Collecting a new email", skip_all, fields(source = ?payload.source))]
pub async fn submit(
    store: &dyn SubscriberStore,
    payload: SubscribePayload,
    ctx: RequestContext,
) -> Result<SubscriberRecord, SubmitError> {
    let SubscribePayload {
        email,
        source,
        page_url,
        referrer,
    } = payload;

    let (email, source) = match (email, source) {
        (Some(email), Some(source)) if !email.is_empty() && !source.is_empty() => (email, source),
        _ => return Err(SubmitError::MissingField),
    };

    let draft = SubscriberDraft {
        email,
        source,
        metadata: SubscriberMetadata {
            user_agent: ctx.user_agent,
            ip: ctx.ip,
            page_url,
            referrer,
        },
    };

    match store.insert(draft).await {
        Ok(record) => {
            info!("[{}] New email collected: {}", record.source, record.email);
            Ok(record)
        }
        Err(StoreError::Validation(errors)) => {
            warn!("Rejected submission: {errors}");
            Err(SubmitError::Validation(errors))
        }
        Err(er) => {
            let er = SubmitError::Internal(er);
            error!("Error collecting email: {er:?}");
            Err(er)
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("Email and Source are required fields.")]
    MissingField,
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("failed to store the subscriber")]
    Internal(#[source] StoreError),
}

impl core::fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        utils::error_chain_fmt(self, f)
    }
}
