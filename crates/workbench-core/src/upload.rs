//! Validated decoding of interaction records supplied as a JSON document.

use crate::domain::{CustomerId, InteractionType, NewInteraction, ProductId};
use crate::time::parse_instant;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadDecodeError {
    #[error("invalid JSON: {0}")]
    Syntax(String),
    #[error("expected an interaction object or an array of them")]
    UnexpectedShape,
    #[error("no interactions found")]
    Empty,
    #[error("record {index}: {message}")]
    Record { index: usize, message: String },
}

/// Decodes one object or an array of objects into candidate records.
///
/// Numeric fields accept numbers or numeric strings. A missing
/// `interactionDate` defaults to `now`; a present `id` is ignored.
pub fn decode_interactions(
    input: &str,
    now: DateTime<Utc>,
) -> Result<Vec<NewInteraction>, UploadDecodeError> {
    let value: Value =
        serde_json::from_str(input).map_err(|err| UploadDecodeError::Syntax(err.to_string()))?;

    let records = match value {
        Value::Object(map) => vec![map],
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                _ => Err(record_error(index, "expected an object")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(UploadDecodeError::UnexpectedShape),
    };

    if records.is_empty() {
        return Err(UploadDecodeError::Empty);
    }

    records
        .iter()
        .enumerate()
        .map(|(index, map)| {
            decode_record(map, now).map_err(|message| record_error(index, message))
        })
        .collect()
}

fn record_error(index: usize, message: impl Into<String>) -> UploadDecodeError {
    UploadDecodeError::Record {
        index,
        message: message.into(),
    }
}

fn decode_record(map: &Map<String, Value>, now: DateTime<Utc>) -> Result<NewInteraction, String> {
    let product_id = required_integer(map, "productId")?;
    let customer_id = required_integer(map, "customerId")?;
    let interaction_type = match map.get("interactionType") {
        Some(Value::String(raw)) if !raw.trim().is_empty() => raw
            .parse::<InteractionType>()
            .map_err(|err| err.to_string())?,
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err("interactionType is required".to_string())
        }
        Some(_) => return Err("interactionType must be a string".to_string()),
    };
    let customer_rating = optional_integer(map, "customerRating")?
        .map(|value| i32::try_from(value).map_err(|_| "customerRating is out of range".to_string()))
        .transpose()?;
    let interaction_date = match optional_text(map, "interactionDate")? {
        Some(raw) => parse_instant(&raw).map_err(|err| format!("interactionDate: {}", err))?,
        None => now,
    };

    Ok(NewInteraction {
        product_id: ProductId(product_id),
        customer_id: CustomerId(customer_id),
        interaction_type,
        customer_rating,
        feedback: optional_text(map, "feedback")?,
        interaction_date,
        responses_from_customer_support: optional_text(map, "responsesFromCustomerSupport")?,
    })
}

fn required_integer(map: &Map<String, Value>, key: &str) -> Result<i64, String> {
    optional_integer(map, key)?.ok_or_else(|| format!("{} is required", key))
}

fn optional_integer(map: &Map<String, Value>, key: &str) -> Result<Option<i64>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("{} must be a whole number", key)),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| format!("{} must be a whole number", key))
        }
        Some(_) => Err(format!("{} must be a whole number", key)),
    }
}

fn optional_text(map: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(format!("{} must be a string", key)),
    }
}
