use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amount. Persisted as a decimal string plus an ISO 4217 alpha-3
/// currency code, byte-stable across round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, "USD")
    }

    /// Price for `quantity` units at this unit price.
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency: self.currency.clone(),
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn serializes_amount_as_string() {
        let price = Money::usd(Decimal::new(15000, 2));
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["amount"], "150.00");
        assert_eq!(json["currency"], "USD");

        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn multiplies_by_quantity() {
        let price = Money::usd(Decimal::new(15000, 2));
        let total = price.times(3);
        assert_eq!(total.amount, Decimal::new(45000, 2));
        assert_eq!(total.currency, "USD");
    }
}
