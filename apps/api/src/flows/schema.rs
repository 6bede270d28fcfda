//! Schema Layer — shared input/output contracts for every flow.
//!
//! Wire requests are deliberately loose (missing or `null` fields become empty strings)
//! so that every problem is reported as a field-level validation error.
//! Validated inputs are strict: a `ResumePayload` is either non-trivial text or
//! a decoded, supported document.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::flows::template::Slot;

/// Minimum resume text length accepted by every resume-bearing flow.
pub const MIN_RESUME_TEXT_CHARS: usize = 100;

/// Document types the model provider can read as an embedded media reference.
pub const SUPPORTED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "text/plain",
    "text/markdown",
];

// ────────────────────────────────────────────────────────────────────────────
// Validation errors
// ────────────────────────────────────────────────────────────────────────────

/// A single violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every violated constraint of one request, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    #[cfg(test)]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Returns `value` when nothing was recorded, otherwise the collected errors.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a free-text field against its minimum length and returns it trimmed.
/// Length is counted in characters, not bytes.
pub fn require_min_chars(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    min: usize,
    message: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() < min {
        errors.push(field, message);
    }
    trimmed.to_string()
}

/// Reads an optional string field, treating an explicit `null` like an absent
/// key so it reaches validation as an empty value.
pub fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ────────────────────────────────────────────────────────────────────────────
// Data URI
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    #[error("value is not a data URI")]
    MissingPrefix,
    #[error("data URI does not declare a MIME type")]
    MissingMimeType,
    #[error("data URI payload must be base64 encoded")]
    NotBase64,
    #[error("data URI payload is not valid base64")]
    InvalidBase64,
    #[error("data URI payload is empty")]
    EmptyPayload,
    #[error("unsupported document type '{0}'")]
    UnsupportedType(String),
}

/// A decoded `data:<mime>;base64,<payload>` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    data: Bytes,
}

impl DataUri {
    pub fn new(mime: &str, data: impl Into<Bytes>) -> Result<Self, DataUriError> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.is_empty() {
            return Err(DataUriError::MissingMimeType);
        }
        if !SUPPORTED_DOCUMENT_TYPES.contains(&mime.as_str()) {
            return Err(DataUriError::UnsupportedType(mime));
        }
        let data = data.into();
        if data.is_empty() {
            return Err(DataUriError::EmptyPayload);
        }
        Ok(Self { mime, data })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload re-encoded as standard base64.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn is_text(&self) -> bool {
        self.mime.starts_with("text/")
    }
}

impl FromStr for DataUri {
    type Err = DataUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUriError::MissingPrefix)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUriError::NotBase64)?;

        // `meta` is `<mime>[;param=value]*;base64`
        let mime = meta.split(';').next().unwrap_or_default();
        if mime.trim().is_empty() {
            return Err(DataUriError::MissingMimeType);
        }
        if !meta.ends_with(";base64") {
            return Err(DataUriError::NotBase64);
        }

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|_| DataUriError::InvalidBase64)?;
        Self::new(mime, data)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.base64())
    }
}

impl Serialize for DataUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume payload
// ────────────────────────────────────────────────────────────────────────────

/// The resume a flow works from: pasted text or an uploaded document.
/// Serialises as `{"resumeText": ..}` or `{"resumeDocument": "data:.."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResumePayload {
    #[serde(rename = "resumeText")]
    Text(String),
    #[serde(rename = "resumeDocument")]
    Document(DataUri),
}

impl ResumePayload {
    /// The template slot for this payload. Text is substituted verbatim,
    /// documents are attached as media.
    pub fn slot(&self) -> Slot<'_> {
        match self {
            ResumePayload::Text(text) => Slot::Text(text),
            ResumePayload::Document(uri) => Slot::Media(uri),
        }
    }
}

/// Which resume shape a flow asks for by default. Only changes the message
/// shown when no resume was supplied at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeShape {
    Text,
    Document,
}

/// Wire shape for resume-bearing flows. Either field may be used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeFields {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default, alias = "resumeDataUri")]
    pub resume_document: Option<String>,
}

impl ResumeFields {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            resume_text: Some(text.into()),
            resume_document: None,
        }
    }

    #[cfg(test)]
    pub fn document(data_uri: impl Into<String>) -> Self {
        Self {
            resume_text: None,
            resume_document: Some(data_uri.into()),
        }
    }

    /// Resolves the wire fields into exactly one payload, recording any
    /// violation in `errors`.
    pub fn into_payload(
        self,
        canonical: ResumeShape,
        errors: &mut ValidationErrors,
    ) -> Option<ResumePayload> {
        let text = self.resume_text.filter(|t| !t.trim().is_empty());
        let document = self.resume_document.filter(|d| !d.trim().is_empty());

        match (text, document) {
            (Some(_), Some(_)) => {
                errors.push(
                    "resume",
                    "Provide either resume text or a resume document, not both.",
                );
                None
            }
            (Some(text), None) => {
                // Length is judged on the trimmed text; the resume itself goes
                // into the prompt as sent.
                require_min_chars(
                    errors,
                    "resumeText",
                    &text,
                    MIN_RESUME_TEXT_CHARS,
                    "Resume text must be at least 100 characters.",
                );
                Some(ResumePayload::Text(text))
            }
            (None, Some(document)) => match document.parse::<DataUri>() {
                Ok(uri) => Some(ResumePayload::Document(uri)),
                Err(DataUriError::MissingPrefix) => {
                    errors.push("resumeDocument", "Please upload your resume.");
                    None
                }
                Err(e) => {
                    errors.push("resumeDocument", format!("Invalid resume document: {e}."));
                    None
                }
            },
            (None, None) => {
                match canonical {
                    ResumeShape::Text => errors.push(
                        "resumeText",
                        "Resume text must be at least 100 characters.",
                    ),
                    ResumeShape::Document => {
                        errors.push("resumeDocument", "Please upload your resume.")
                    }
                }
                None
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output checks
// ────────────────────────────────────────────────────────────────────────────

/// A declared text output must carry content.
pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("output field '{field}' is empty"));
    }
    Ok(())
}

/// A declared sequence output must be non-empty with no blank items.
pub fn require_items(field: &str, items: &[String]) -> Result<(), String> {
    if items.is_empty() {
        return Err(format!("output field '{field}' has no items"));
    }
    if let Some(i) = items.iter().position(|item| item.trim().is_empty()) {
        return Err(format!("output field '{field}' item {i} is empty"));
    }
    Ok(())
}
