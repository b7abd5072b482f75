use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AttachmentMeta;

/// 已保存的支援工單；建立後不可變更。 / A persisted support request, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub subject: String,
    pub contact_email: String,
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentMeta>,
}

/// User supplied fields for a new ticket. Attachments must already be validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFields {
    pub subject: String,
    pub contact_email: String,
    pub message: String,
    pub attachments: Vec<AttachmentMeta>,
}

impl SupportTicket {
    pub(crate) fn issue(fields: TicketFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ticket_id(created_at),
            created_at,
            subject: fields.subject,
            contact_email: fields.contact_email,
            message: fields.message,
            attachments: fields.attachments,
        }
    }
}

// The random suffix keeps ids distinct within the same millisecond.
fn ticket_id(created_at: DateTime<Utc>) -> String {
    format!(
        "TKT-{}-{}",
        created_at.timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_differ_for_identical_timestamps() {
        let now = Utc::now();
        let first = SupportTicket::issue(TicketFields::default(), now);
        let second = SupportTicket::issue(TicketFields::default(), now);
        assert_ne!(first.id, second.id);
        let prefix = format!("TKT-{}-", now.timestamp_millis());
        assert!(first.id.starts_with(&prefix));
    }

    #[test]
    fn serialized_shape_uses_camel_case_fields() {
        let fields = TicketFields {
            subject: "Login issue".into(),
            contact_email: "user@example.cv".into(),
            message: "Cannot log in".into(),
            attachments: vec![AttachmentMeta::new("a.png", 10, "image/png")],
        };
        let ticket = SupportTicket::issue(fields, Utc::now());
        let value = serde_json::to_value(&ticket).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["contactEmail"], "user@example.cv");
        assert_eq!(value["attachments"][0]["type"], "image/png");
    }
}
