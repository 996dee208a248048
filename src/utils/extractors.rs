use std::collections::HashMap;

use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
};
use serde_json::Value;

use crate::error::{AppError, Result};

/// A file part of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
}

/// One raw value as submitted by the client, before any validation.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
    /// Arrays and objects.
    Nested,
    File(UploadedFile),
}

/// Raw product fields taken from a JSON, multipart or urlencoded body.
///
/// Form encodings cannot express `null`, so empty form values and empty
/// file inputs are dropped and read as "not submitted".
#[derive(Debug, Clone, Default)]
pub struct ProductPayload {
    fields: HashMap<String, FieldInput>,
}

impl ProductPayload {
    pub fn take(&mut self, name: &str) -> Option<FieldInput> {
        self.fields.remove(name)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::BadRequest(format!("JSON parse error - {}", e)))?;

        let Value::Object(map) = value else {
            return Err(AppError::BadRequest(format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(&value)
            )));
        };

        let fields = map
            .into_iter()
            .map(|(key, value)| {
                let input = match value {
                    Value::String(s) => FieldInput::Text(s),
                    Value::Number(n) => FieldInput::Number(n),
                    Value::Bool(b) => FieldInput::Bool(b),
                    Value::Null => FieldInput::Null,
                    Value::Array(_) | Value::Object(_) => FieldInput::Nested,
                };
                (key, input)
            })
            .collect();

        Ok(Self { fields })
    }

    pub fn from_form_pairs(pairs: Vec<(String, String)>) -> Self {
        let fields = pairs
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key, FieldInput::Text(value)))
            .collect();

        Self { fields }
    }

    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            body_rejection(e.status(), format!("Multipart form parse error - {}", e))
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            let input = match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(|e| {
                        body_rejection(e.status(), format!("Multipart form parse error - {}", e))
                    })?;

                    // Browsers send an unnamed, empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }

                    FieldInput::File(UploadedFile { bytes })
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        body_rejection(e.status(), format!("Multipart form parse error - {}", e))
                    })?;
                    if text.is_empty() {
                        continue;
                    }
                    FieldInput::Text(text)
                }
            };

            fields.insert(name, input);
        }

        Ok(Self { fields })
    }
}

/// Keeps "payload too large" distinct from other malformed-body failures.
fn body_rejection(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let content_type = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());

        match content_type.as_deref() {
            None => Ok(Self::default()),
            Some(ct) if ct.starts_with("application/json") => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| body_rejection(e.status(), e.body_text()))?;
                Self::from_json(&bytes)
            }
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let mut multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| body_rejection(e.status(), e.body_text()))?;
                Self::from_multipart(&mut multipart).await
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| body_rejection(e.status(), e.body_text()))?;
                Ok(Self::from_form_pairs(pairs))
            }
            Some(other) => Err(AppError::UnsupportedMediaType(format!(
                "Unsupported media type \"{}\" in request.",
                other
            ))),
        }
    }
}
