//! Turning handler output into an HTTP response.
//!
//! Translation happens in two steps. The handler's [`Value`] is validated into
//! a [`ResponseRecord`] first; only a record that passed is written out, so a
//! rejected response never leaves partial output behind.

use log::debug;

use crate::server::error::{Error, TranslationError};
use crate::server::response::{Body, ResponseRecord, ResponseWriter, is_valid_header};
use crate::value::Value;

impl ResponseRecord {
    /// Validate a handler response.
    ///
    /// `status` must convert to an integer in `100..=999` and header names
    /// and values may not contain line breaks or NUL. In lenient mode
    /// headers that are not a name/value mapping and bodies that are neither
    /// raw bytes nor text are dropped; in strict mode they are errors.
    pub fn from_value(value: Value, strict: bool) -> Result<Self, TranslationError> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(TranslationError::NotAList(other.kind())),
        };

        let mut status = None;
        let mut headers = None;
        let mut body = None;
        for (name, item) in items {
            if matches!(item, Value::Null) {
                continue;
            }
            // First occurrence wins, matching a by-name lookup
            match name.as_str() {
                "status" if status.is_none() => status = Some(item),
                "headers" if headers.is_none() => headers = Some(item),
                "body" if body.is_none() => body = Some(item),
                _ => {}
            }
        }

        let status = status_code(status.ok_or(TranslationError::MissingStatus)?)?;
        let headers = match headers {
            None => Vec::new(),
            Some(value) => header_pairs(value, strict)?,
        };
        if let Some((name, _)) = headers.iter().find(|(name, value)| !is_valid_header(name, value)) {
            return Err(TranslationError::InvalidHeader(name.clone()));
        }
        let body = match body {
            None => Body::Empty,
            Some(value) => body_shape(value, strict)?,
        };

        Ok(Self { status, headers, body })
    }
}

impl TryFrom<Value> for ResponseRecord {
    type Error = TranslationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value, false)
    }
}

fn status_code(value: Value) -> Result<u16, TranslationError> {
    let code = match &value {
        Value::Integer(n) => Some(*n),
        Value::Double(d) if d.fract() == 0.0 && d.is_finite() => Some(*d as i64),
        Value::Text(_) => value.as_str().and_then(|s| s.trim().parse::<i64>().ok()),
        _ => None,
    };

    match code {
        Some(n @ 100..=999) => Ok(n as u16),
        Some(n) => Err(TranslationError::InvalidStatus(n.to_string())),
        None => Err(TranslationError::InvalidStatus(describe(&value))),
    }
}

fn header_pairs(value: Value, strict: bool) -> Result<Vec<(String, String)>, TranslationError> {
    match value {
        Value::Named(pairs) => Ok(pairs),
        Value::List(items) if items.iter().all(|(_, v)| v.as_str().is_some()) => Ok(items
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect()),
        other if strict => Err(TranslationError::UnsupportedHeaders(other.kind())),
        other => {
            debug!("Ignoring headers of type {}", other.kind());
            Ok(Vec::new())
        }
    }
}

fn body_shape(value: Value, strict: bool) -> Result<Body, TranslationError> {
    match value {
        Value::Raw(bytes) => Ok(Body::Bytes(bytes)),
        Value::Text(chunks) => Ok(Body::TextChunks(chunks)),
        Value::Named(pairs) => Ok(Body::TextChunks(pairs.into_iter().map(|(_, v)| v).collect())),
        other if strict => Err(TranslationError::UnsupportedBody(other.kind())),
        other => {
            debug!("Ignoring body of type {}", other.kind());
            Ok(Body::Empty)
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Text(items) if items.len() == 1 => format!("{:?}", items[0]),
        Value::Double(d) => d.to_string(),
        other => other.kind().to_string(),
    }
}

/// Write a validated record onto `out`.
///
/// The response is marked handled only after status, headers and body were
/// all written. A failed write aborts the response and is returned as is.
pub fn write_response<W>(record: ResponseRecord, out: &mut W) -> Result<(), Error>
where
    W: ResponseWriter + ?Sized,
{
    out.set_status(record.status);

    for (name, value) in &record.headers {
        out.set_header(name, value);
    }

    match &record.body {
        Body::Empty => {}
        Body::Bytes(bytes) => out.write_bytes(bytes)?,
        Body::TextChunks(chunks) => {
            for chunk in chunks {
                out.write_text(chunk)?;
            }
        }
    }

    out.mark_handled();
    Ok(())
}

/// Validate a handler response and write it onto `out`.
pub fn translate<W>(value: Value, out: &mut W, strict: bool) -> Result<(), Error>
where
    W: ResponseWriter + ?Sized,
{
    let record = ResponseRecord::from_value(value, strict)?;
    write_response(record, out)
}
