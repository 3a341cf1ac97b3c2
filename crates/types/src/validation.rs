//! Validation helpers for wire-level string values.
//!
//! These centralize the checks the order and provisioning use cases apply to
//! caller-supplied strings before anything touches the store.

/// Valid ticket type values
pub const VALID_TICKET_TYPES: &[&str] = &["VIP", "GENERAL", "PREMIUM", "ECONOMY"];

/// Validates that a value is one of the allowed values.
pub fn validate_enum_value(value: &str, valid_values: &[&str], field_name: &str) -> Result<(), String> {
    if valid_values.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        ))
    }
}

/// Validates a ticket type value
pub fn validate_ticket_type(ticket_type: &str) -> Result<(), String> {
    validate_enum_value(ticket_type, VALID_TICKET_TYPES, "ticket type")
}

/// Validates an ISO 4217 alpha-3 currency code
pub fn validate_currency(currency: &str) -> Result<(), String> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(format!(
            "Invalid currency. Must be an ISO 4217 alpha-3 code, got: {currency}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ticket_type() {
        assert!(validate_ticket_type("VIP").is_ok());
        assert!(validate_ticket_type("GENERAL").is_ok());
        assert!(validate_ticket_type("vip").is_err());
        assert!(validate_ticket_type("BALCONY").is_err());
    }

    #[test]
    fn valid_ticket_types_agree_with_the_enum() {
        use crate::enums::TicketType;
        for value in VALID_TICKET_TYPES {
            let parsed: TicketType = value.parse().expect("listed type must parse");
            assert_eq!(&parsed.as_str(), value);
        }
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("DOLLARS").is_err());
    }
}
