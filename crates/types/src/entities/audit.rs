use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::TicketStatus;

/// Append-only record of one attempted ticket transition, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketStateTransitionAudit {
    pub audit_id: String,
    pub ticket_id: String,
    pub from_status: TicketStatus,
    pub to_status: TicketStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub at: DateTime<Utc>,
    pub performed_by: String,
    pub reason: Option<String>,
    pub successful: bool,
    pub error: Option<String>,
}

impl TicketStateTransitionAudit {
    pub fn success(
        ticket_id: impl Into<String>,
        from_status: TicketStatus,
        to_status: TicketStatus,
        performed_by: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            audit_id: Uuid::new_v4().to_string(),
            ticket_id: ticket_id.into(),
            from_status,
            to_status,
            at: super::now(),
            performed_by: performed_by.into(),
            reason,
            successful: true,
            error: None,
        }
    }

    pub fn failure(
        ticket_id: impl Into<String>,
        from_status: TicketStatus,
        to_status: TicketStatus,
        performed_by: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            audit_id: Uuid::new_v4().to_string(),
            ticket_id: ticket_id.into(),
            from_status,
            to_status,
            at: super::now(),
            performed_by: performed_by.into(),
            reason: None,
            successful: false,
            error: Some(error.into()),
        }
    }
}
