use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

/// Image URL extracted from an image-search payload. Not checked for syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload is not valid JSON: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(&'static str),
    #[error("payload list is empty")]
    EmptyPayload,
    #[error("payload record has no \"{0}\" field")]
    MissingField(&'static str),
}

/// Extract the image URL from a `[{"url": ...}, ...]` payload.
/// Only the first record is looked at.
pub fn parse_image_url(body: &[u8]) -> Result<ImageUrl, ParseError> {
    let result = extract(body);
    match &result {
        Ok(url) => info!("Image payload is valid: {}", url),
        Err(e) => error!("Image payload rejected: {}", e),
    }
    result
}

fn extract(body: &[u8]) -> Result<ImageUrl, ParseError> {
    let value: Value = serde_json::from_slice(body)?;

    let Value::Array(records) = value else {
        return Err(ParseError::UnexpectedShape("expected list"));
    };
    let first = records.into_iter().next().ok_or(ParseError::EmptyPayload)?;

    let Value::Object(mut record) = first else {
        return Err(ParseError::UnexpectedShape("expected object"));
    };
    match record.remove("url") {
        Some(Value::String(url)) => Ok(ImageUrl(url)),
        Some(_) => Err(ParseError::UnexpectedShape("expected string")),
        None => Err(ParseError::MissingField("url")),
    }
}
