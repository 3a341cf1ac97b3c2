use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer payment metadata attached to an order at confirmation. One row
/// per order, keyed by `order_id`, written once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub order_id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub payment_method: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl CustomerInfo {
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        let now = super::now();
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
            city: city.into(),
            country: country.into(),
            payment_method: payment_method.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
