//! The subscriber record, its schema validation and the types flowing into the store.
//! Validation is done through constrained construction: a `ValidSubscriber` can only be built
//! from a `SubscriberDraft` whose fields all pass their checks.

use chrono::{DateTime, Utc};
use lazy_regex::regex_is_match;
use uuid::Uuid;

// ###################################
// ->   STRUCTS
// ###################################
/// Request-derived and page-derived information attached to a submission.
/// None of these fields are validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberMetadata {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub page_url: Option<String>,
    pub referrer: Option<String>,
}

/// Candidate record handed to the store, fields not yet validated.
#[derive(Debug, Clone)]
pub struct SubscriberDraft {
    pub email: String,
    pub source: String,
    pub metadata: SubscriberMetadata,
}

/// Validated Subscriber
/// A Subscriber with all the schema checks passed and the fields normalized.
#[derive(Debug, Clone)]
pub struct ValidSubscriber {
    pub email: ValidEmail,
    pub source: ValidSource,
    pub metadata: SubscriberMetadata,
}

impl TryFrom<SubscriberDraft> for ValidSubscriber {
    type Error = ValidationErrors;

    fn try_from(draft: SubscriberDraft) -> Result<Self, Self::Error> {
        let email = ValidEmail::parse(draft.email);
        let source = ValidSource::parse(draft.source);

        match (email, source) {
            (Ok(email), Ok(source)) => Ok(ValidSubscriber {
                email,
                source,
                metadata: draft.metadata,
            }),
            (email, source) => {
                let errors = [email.err(), source.err()].into_iter().flatten().collect();
                Err(ValidationErrors(errors))
            }
        }
    }
}

/// Validated, trimmed and lower-cased subscriber email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, FieldError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim().to_lowercase();

        if value.is_empty() {
            return Err(FieldError::EmailRequired);
        }

        if regex_is_match!(r"^\S+@\S+\.\S+$", &value) {
            Ok(ValidEmail(value))
        } else {
            Err(FieldError::EmailInvalid)
        }
    }
}

/// Validated and trimmed origin site identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSource(String);

impl AsRef<str> for ValidSource {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidSource {
    pub fn parse<S>(value: S) -> Result<Self, FieldError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(FieldError::SourceRequired);
        }

        Ok(ValidSource(value.to_owned()))
    }
}

/// A persisted subscriber.
#[derive(Debug, Clone)]
pub struct SubscriberRecord {
    pub id: Uuid,
    pub email: String,
    pub source: String,
    pub metadata: SubscriberMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriberRecord {
    /// Assigns a fresh id and sets both timestamps to `now`.
    pub fn new(subscriber: ValidSubscriber, now: DateTime<Utc>) -> Self {
        let ValidSubscriber {
            email,
            source,
            metadata,
        } = subscriber;

        Self {
            id: Uuid::new_v4(),
            email: email.0,
            source: source.0,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
/// A single failing field. The display text is the message shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Please use a valid email address.")]
    EmailInvalid,
    #[error("Source is required")]
    SourceRequired,
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::EmailRequired | FieldError::EmailInvalid => "email",
            FieldError::SourceRequired => "source",
        }
    }
}

/// Every failing field of a draft, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let messages = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
