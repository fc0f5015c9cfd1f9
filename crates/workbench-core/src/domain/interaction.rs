use crate::domain::ids::{CustomerId, InteractionId, ProductId};
use crate::error::CoreError;
use crate::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InteractionType {
    Chat,
    Email,
    Ticket,
    Form,
}

impl InteractionType {
    pub const ALL: [InteractionType; 4] = [
        InteractionType::Chat,
        InteractionType::Email,
        InteractionType::Ticket,
        InteractionType::Form,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::Chat => "CHAT",
            InteractionType::Email => "EMAIL",
            InteractionType::Ticket => "TICKET",
            InteractionType::Form => "FORM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InteractionType::Chat => "Chat",
            InteractionType::Email => "Email",
            InteractionType::Ticket => "Ticket",
            InteractionType::Form => "Form",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        InteractionType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::InvalidInteractionType(trimmed.to_string()))
    }
}

/// A persisted interaction as the backend returns it.
///
/// `interaction_date` stays the server's string: the backend emits local
/// date-times without an offset, so callers parse it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<InteractionId>,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub interaction_type: InteractionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub interaction_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses_from_customer_support: Option<String>,
}

impl Interaction {
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        time::parse_wire_datetime(&self.interaction_date).ok()
    }

    /// Customer feedback, falling back to the support response.
    pub fn message(&self) -> Option<&str> {
        self.feedback
            .as_deref()
            .or(self.responses_from_customer_support.as_deref())
    }
}

/// Candidate record submitted for creation; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInteraction {
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub interaction_type: InteractionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(with = "time::iso_millis")]
    pub interaction_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses_from_customer_support: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub ingested: u64,
}

#[cfg(test)]
mod tests {
    use super::{Interaction, InteractionType, NewInteraction};
    use crate::domain::{CustomerId, ProductId};
    use chrono::{Local, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn interaction_type_parses_any_case() {
        assert_eq!("email".parse::<InteractionType>(), Ok(InteractionType::Email));
        assert_eq!(" TICKET ".parse::<InteractionType>(), Ok(InteractionType::Ticket));
        assert!("fax".parse::<InteractionType>().is_err());
    }

    #[test]
    fn interaction_decodes_backend_shape() {
        let value = json!({
            "id": 1,
            "productId": 7,
            "customerId": 123,
            "interactionType": "CHAT",
            "customerRating": null,
            "feedback": "Nice",
            "interactionDate": "2025-01-01T12:00:00",
            "responsesFromCustomerSupport": null
        });
        let interaction: Interaction = serde_json::from_value(value).expect("decode");
        assert_eq!(interaction.customer_id, CustomerId(123));
        assert_eq!(interaction.customer_rating, None);
        assert_eq!(interaction.message(), Some("Nice"));
        assert_eq!(
            interaction.occurred_at(),
            Local
                .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
                .single()
                .map(|local| local.with_timezone(&Utc))
        );
    }

    #[test]
    fn new_interaction_omits_id_and_empty_fields() {
        let record = NewInteraction {
            product_id: ProductId(1),
            customer_id: CustomerId(2),
            interaction_type: InteractionType::Chat,
            customer_rating: None,
            feedback: None,
            interaction_date: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
            responses_from_customer_support: None,
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({
                "productId": 1,
                "customerId": 2,
                "interactionType": "CHAT",
                "interactionDate": "2025-03-04T05:06:07.000Z"
            })
        );
    }
}
