use crate::domain::{CustomerId, InteractionType, ProductId};
use crate::error::CoreError;
use crate::time::{format_instant, iso_millis};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Ordered `(name, value)` pairs sent as the list endpoint's query string.
pub type QueryParams = Vec<(&'static str, String)>;

/// Filter and pagination descriptor for the interactions list.
///
/// Every field is optional; absent fields never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionQuery {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub customer_id: Option<CustomerId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub product_id: Option<ProductId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub interaction_type: Option<InteractionType>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "iso_millis::option::serialize",
        deserialize_with = "blank_as_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "iso_millis::option::serialize",
        deserialize_with = "blank_as_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub page: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub size: Option<u32>,
}

impl InteractionQuery {
    /// First page at the given size, no filters.
    pub fn first_page(size: u32) -> Self {
        Self {
            page: Some(0),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_param(&mut params, "customerId", self.customer_id);
        push_param(&mut params, "productId", self.product_id);
        push_param(&mut params, "interactionType", self.interaction_type);
        push_param(&mut params, "startDate", self.start_date.map(format_instant));
        push_param(&mut params, "endDate", self.end_date.map(format_instant));
        push_param(&mut params, "page", self.page);
        push_param(&mut params, "size", self.size);
        params
    }

    /// Fields present in `other` replace the ones in `self`.
    pub fn overlay(&self, other: &InteractionQuery) -> InteractionQuery {
        InteractionQuery {
            customer_id: other.customer_id.or(self.customer_id),
            product_id: other.product_id.or(self.product_id),
            interaction_type: other.interaction_type.or(self.interaction_type),
            start_date: other.start_date.or(self.start_date),
            end_date: other.end_date.or(self.end_date),
            page: other.page.or(self.page),
            size: other.size.or(self.size),
        }
    }

    /// Composes a partial filter update with this query.
    ///
    /// Pagination resets to the first page unless the patch names a page;
    /// size falls back from the patch to this query to `default_size`.
    pub fn apply(&self, patch: &QueryPatch, default_size: u32) -> InteractionQuery {
        InteractionQuery {
            customer_id: patch.customer_id.apply_to(self.customer_id),
            product_id: patch.product_id.apply_to(self.product_id),
            interaction_type: patch.interaction_type.apply_to(self.interaction_type),
            start_date: patch.start_date.apply_to(self.start_date),
            end_date: patch.end_date.apply_to(self.end_date),
            page: Some(patch.page.unwrap_or(0)),
            size: Some(patch.size.or(self.size).unwrap_or(default_size)),
        }
    }

    /// Pins page and size to what the server actually returned.
    pub fn reconcile(mut self, page: u32, size: u32) -> InteractionQuery {
        self.page = Some(page);
        self.size = Some(size);
        self
    }

    pub fn has_filters(&self) -> bool {
        self.customer_id.is_some()
            || self.product_id.is_some()
            || self.interaction_type.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }
}

fn push_param<T: Display>(params: &mut QueryParams, name: &'static str, value: Option<T>) {
    if let Some(value) = value {
        let rendered = value.to_string();
        if !rendered.is_empty() {
            params.push((name, rendered));
        }
    }
}

pub fn validate_page_size(size: u32) -> Result<u32, CoreError> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(CoreError::InvalidPageSize(size));
    }
    Ok(size)
}

/// One field of a [`QueryPatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Keep
    }
}

impl<T: Copy> Field<T> {
    /// An explicit value: `None` clears the field.
    pub fn explicit(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Set(value),
            None => Field::Clear,
        }
    }

    /// A sparse value: `None` leaves the field untouched.
    pub fn sparse(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Set(value),
            None => Field::Keep,
        }
    }

    pub fn apply_to(&self, current: Option<T>) -> Option<T> {
        match self {
            Field::Keep => current,
            Field::Clear => None,
            Field::Set(value) => Some(*value),
        }
    }
}

/// Partial filter update handed to a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub customer_id: Field<CustomerId>,
    pub product_id: Field<ProductId>,
    pub interaction_type: Field<InteractionType>,
    pub start_date: Field<DateTime<Utc>>,
    pub end_date: Field<DateTime<Utc>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl QueryPatch {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn clear_filters() -> Self {
        Self {
            customer_id: Field::Clear,
            product_id: Field::Clear,
            interaction_type: Field::Clear,
            start_date: Field::Clear,
            end_date: Field::Clear,
            page: None,
            size: None,
        }
    }
}

impl From<InteractionQuery> for QueryPatch {
    fn from(query: InteractionQuery) -> Self {
        Self {
            customer_id: Field::sparse(query.customer_id),
            product_id: Field::sparse(query.product_id),
            interaction_type: Field::sparse(query.interaction_type),
            start_date: Field::sparse(query.start_date),
            end_date: Field::sparse(query.end_date),
            page: query.page,
            size: query.size,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Blankable<T> {
    Value(T),
    Text(String),
}

/// Deserializes an optional value where `null` and blank strings mean absent.
/// Non-blank strings are parsed with `FromStr`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<Blankable<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Blankable::Value(value)) => Ok(Some(value)),
        Some(Blankable::Text(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse().map(Some).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_page_size, Field, InteractionQuery, QueryPatch};
    use crate::domain::{CustomerId, InteractionType, ProductId};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn populated() -> InteractionQuery {
        InteractionQuery {
            customer_id: Some(CustomerId(42)),
            product_id: None,
            interaction_type: Some(InteractionType::Email),
            start_date: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            end_date: None,
            page: Some(3),
            size: Some(25),
        }
    }

    #[test]
    fn empty_query_produces_no_params() {
        assert!(InteractionQuery::default().to_params().is_empty());
    }

    #[test]
    fn blank_and_null_fields_deserialize_as_absent() {
        let query: InteractionQuery = serde_json::from_value(json!({
            "customerId": "",
            "productId": null,
            "interactionType": "  ",
            "startDate": "",
            "endDate": null,
            "page": "",
            "size": null
        }))
        .expect("decode");
        assert_eq!(query, InteractionQuery::default());
        assert!(query.to_params().is_empty());
    }

    #[test]
    fn numeric_strings_deserialize_as_values() {
        let query: InteractionQuery = serde_json::from_value(json!({
            "customerId": "42",
            "interactionType": "EMAIL",
            "page": 1
        }))
        .expect("decode");
        assert_eq!(query.customer_id, Some(CustomerId(42)));
        assert_eq!(query.interaction_type, Some(InteractionType::Email));
        assert_eq!(query.page, Some(1));
    }

    #[test]
    fn params_contain_exactly_present_fields() {
        let query = InteractionQuery {
            customer_id: Some(CustomerId(42)),
            interaction_type: Some(InteractionType::Email),
            page: Some(0),
            size: Some(10),
            ..InteractionQuery::default()
        };
        let params = query.to_params();
        assert_eq!(
            params,
            vec![
                ("customerId", "42".to_string()),
                ("interactionType", "EMAIL".to_string()),
                ("page", "0".to_string()),
                ("size", "10".to_string()),
            ]
        );
    }

    #[test]
    fn dates_are_sent_with_millisecond_precision() {
        let params = populated().to_params();
        assert!(params.contains(&("startDate", "2025-01-01T00:00:00.000Z".to_string())));
    }

    #[test]
    fn empty_patch_resets_page_and_keeps_size() {
        let next = populated().apply(&QueryPatch::default(), 10);
        assert_eq!(next.page, Some(0));
        assert_eq!(next.size, Some(25));
        assert_eq!(next.customer_id, Some(CustomerId(42)));
        assert_eq!(next.interaction_type, Some(InteractionType::Email));
    }

    #[test]
    fn page_patch_only_moves_the_page() {
        let current = populated();
        let next = current.apply(&QueryPatch::page(5), 10);
        assert_eq!(next, current.clone().reconcile(5, 25));
    }

    #[test]
    fn size_falls_back_to_default() {
        let current = InteractionQuery::default();
        let next = current.apply(&QueryPatch::default(), 10);
        assert_eq!(next.size, Some(10));
        let next = current.apply(
            &QueryPatch {
                size: Some(50),
                ..QueryPatch::default()
            },
            10,
        );
        assert_eq!(next.size, Some(50));
    }

    #[test]
    fn explicit_fields_clear_and_sparse_fields_keep() {
        let current = populated();
        let patch = QueryPatch {
            customer_id: Field::explicit(None),
            product_id: Field::sparse(Some(ProductId(9))),
            ..QueryPatch::default()
        };
        let next = current.apply(&patch, 10);
        assert_eq!(next.customer_id, None);
        assert_eq!(next.product_id, Some(ProductId(9)));
        assert_eq!(next.interaction_type, Some(InteractionType::Email));

        let cleared = current.apply(&QueryPatch::clear_filters(), 10);
        assert!(!cleared.has_filters());
        assert_eq!(cleared.size, Some(25));
    }

    #[test]
    fn query_converts_to_sparse_patch() {
        let patch = QueryPatch::from(InteractionQuery {
            customer_id: Some(CustomerId(456)),
            interaction_type: Some(InteractionType::Email),
            ..InteractionQuery::default()
        });
        let next = InteractionQuery::first_page(10).apply(&patch, 10);
        assert_eq!(
            next,
            InteractionQuery {
                customer_id: Some(CustomerId(456)),
                interaction_type: Some(InteractionType::Email),
                page: Some(0),
                size: Some(10),
                ..InteractionQuery::default()
            }
        );
    }

    #[test]
    fn overlay_prefers_present_fields() {
        let base = InteractionQuery::first_page(10);
        let merged = base.overlay(&InteractionQuery {
            customer_id: Some(CustomerId(1)),
            size: Some(20),
            ..InteractionQuery::default()
        });
        assert_eq!(merged.page, Some(0));
        assert_eq!(merged.size, Some(20));
        assert_eq!(merged.customer_id, Some(CustomerId(1)));
    }

    #[test]
    fn page_size_bounds() {
        assert!(validate_page_size(0).is_err());
        assert_eq!(validate_page_size(10), Ok(10));
        assert!(validate_page_size(1001).is_err());
    }
}
