//! Coercion of raw form input into typed queries and records.

use crate::domain::{CustomerId, InteractionType, NewInteraction, ProductId};
use crate::query::{Field, InteractionQuery, QueryPatch};
use crate::time::{format_local_input, parse_local_datetime, TimeParseError};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be a whole number")]
    InvalidNumber { field: &'static str },
    #[error("invalid interaction type: {0} (expected CHAT|EMAIL|TICKET|FORM)")]
    InvalidInteractionType(String),
    #[error("{field}: {source}")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: TimeParseError,
    },
}

/// Empty input is absent; anything else must parse as a number.
pub fn parse_numeric<T: FromStr>(field: &'static str, raw: &str) -> Result<Option<T>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| FormError::InvalidNumber { field })
}

pub fn parse_interaction_type(raw: &str) -> Result<Option<InteractionType>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| FormError::InvalidInteractionType(trimmed.to_string()))
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<Option<DateTime<Utc>>, FormError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_local_datetime(raw)
        .map(Some)
        .map_err(|source| FormError::InvalidDate { field, source })
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, FormError> {
    value.ok_or(FormError::Required { field })
}

/// Raw text of the list filter form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub customer_id: String,
    pub product_id: String,
    pub interaction_type: String,
    pub start_date: String,
    pub end_date: String,
}

impl FilterForm {
    pub fn from_query(query: &InteractionQuery) -> Self {
        Self {
            customer_id: query
                .customer_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            product_id: query
                .product_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            interaction_type: query
                .interaction_type
                .map(|kind| kind.as_str().to_string())
                .unwrap_or_default(),
            start_date: query.start_date.map(format_local_input).unwrap_or_default(),
            end_date: query.end_date.map(format_local_input).unwrap_or_default(),
        }
    }

    /// Every filter is explicit: an empty input clears that filter.
    pub fn to_patch(&self) -> Result<QueryPatch, FormError> {
        Ok(QueryPatch {
            customer_id: Field::explicit(parse_numeric::<CustomerId>(
                "customer id",
                &self.customer_id,
            )?),
            product_id: Field::explicit(parse_numeric::<ProductId>(
                "product id",
                &self.product_id,
            )?),
            interaction_type: Field::explicit(parse_interaction_type(&self.interaction_type)?),
            start_date: Field::explicit(parse_date("start date", &self.start_date)?),
            end_date: Field::explicit(parse_date("end date", &self.end_date)?),
            page: Some(0),
            size: None,
        })
    }
}

/// Raw text of the new-interaction form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionForm {
    pub product_id: String,
    pub customer_id: String,
    pub interaction_type: String,
    pub customer_rating: String,
    pub feedback: String,
    pub interaction_date: String,
    pub response: String,
}

impl InteractionForm {
    /// A blank timestamp means `now`.
    pub fn to_new_interaction(&self, now: DateTime<Utc>) -> Result<NewInteraction, FormError> {
        let product_id = required(
            "product id",
            parse_numeric::<ProductId>("product id", &self.product_id)?,
        )?;
        let customer_id = required(
            "customer id",
            parse_numeric::<CustomerId>("customer id", &self.customer_id)?,
        )?;
        let interaction_type = required(
            "interaction type",
            parse_interaction_type(&self.interaction_type)?,
        )?;
        let customer_rating = parse_numeric::<i32>("customer rating", &self.customer_rating)?;
        let interaction_date =
            parse_date("interaction date", &self.interaction_date)?.unwrap_or(now);

        Ok(NewInteraction {
            product_id,
            customer_id,
            interaction_type,
            customer_rating,
            feedback: optional_text(&self.feedback),
            interaction_date,
            responses_from_customer_support: optional_text(&self.response),
        })
    }
}
