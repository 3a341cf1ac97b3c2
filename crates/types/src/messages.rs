use serde::{Deserialize, Serialize};

/// Body of the order-processing queue message. Carries only the order id;
/// the worker reloads the row, so stale payloads cannot overwrite state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueueMessage {
    pub order_id: String,
}

impl OrderQueueMessage {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_order_id_only() {
        let msg = OrderQueueMessage::new("o-123");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"order_id":"o-123"}"#);
        let back: OrderQueueMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
