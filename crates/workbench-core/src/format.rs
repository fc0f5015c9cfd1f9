use crate::domain::Interaction;
use crate::time::format_wire_datetime;

pub const PLACEHOLDER: &str = "—";

/// Server timestamps without an offset are already local and print unshifted.
pub fn format_date_time(value: Option<&str>) -> String {
    value
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| format_wire_datetime(raw).ok())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Cuts `text` to `length` characters, marking the cut with an ellipsis.
pub fn truncate(text: Option<&str>, length: usize) -> String {
    match text {
        None => PLACEHOLDER.to_string(),
        Some(text) if text.is_empty() => PLACEHOLDER.to_string(),
        Some(text) => {
            if text.chars().count() > length {
                let cut: String = text.chars().take(length).collect();
                format!("{}…", cut)
            } else {
                text.to_string()
            }
        }
    }
}

/// Feedback, then the support response, then nothing.
pub fn interaction_message(interaction: &Interaction) -> &str {
    interaction.message().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::{format_date_time, interaction_message, truncate, PLACEHOLDER};
    use crate::domain::{CustomerId, Interaction, InteractionType, ProductId};
    use crate::time::format_local_datetime;
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_date_time_handles_missing_and_invalid() {
        assert_eq!(format_date_time(None), PLACEHOLDER);
        assert_eq!(format_date_time(Some("")), PLACEHOLDER);
        assert_eq!(format_date_time(Some("garbage")), PLACEHOLDER);
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            format_date_time(Some("2025-01-01T12:00:00Z")),
            format_local_datetime(instant)
        );
    }

    #[test]
    fn offsetless_server_time_is_not_shifted() {
        assert_eq!(
            format_date_time(Some("2025-01-02T10:00:00")),
            "2025-01-02 10:00"
        );
        assert_eq!(
            format_date_time(Some("2025-01-02T23:59:59.123")),
            "2025-01-02 23:59"
        );
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate(None, 5), PLACEHOLDER);
        assert_eq!(truncate(Some(""), 5), PLACEHOLDER);
        assert_eq!(truncate(Some("short"), 5), "short");
        assert_eq!(truncate(Some("héllo world"), 5), "héllo…");
    }

    #[test]
    fn interaction_message_falls_back_to_response() {
        let mut interaction = Interaction {
            id: None,
            product_id: ProductId(1),
            customer_id: CustomerId(2),
            interaction_type: InteractionType::Ticket,
            customer_rating: None,
            feedback: None,
            interaction_date: "2025-01-01T12:00:00".to_string(),
            responses_from_customer_support: Some("Refund issued".to_string()),
        };
        assert_eq!(interaction_message(&interaction), "Refund issued");
        interaction.responses_from_customer_support = None;
        assert_eq!(interaction_message(&interaction), "");
    }
}
