use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{flexible_id, flexible_opt_id};
use crate::db::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

impl InquiryStatus {
    /// Convert from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" | "unread" => Some(InquiryStatus::New),
            "read" => Some(InquiryStatus::Read),
            "replied" | "responded" => Some(InquiryStatus::Replied),
            "archived" => Some(InquiryStatus::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Read => "read",
            InquiryStatus::Replied => "replied",
            InquiryStatus::Archived => "archived",
        }
    }
}

/// Stored rows may carry legacy or capitalized spellings; anything unrecognized reads as `new`.
impl<'de> Deserialize<'de> for InquiryStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(InquiryStatus::from_str)
            .unwrap_or_default())
    }
}

impl TryFrom<&str> for InquiryStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value).ok_or_else(|| format!("Invalid inquiry status: {}", value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inquiry {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(alias = "propertyId", deserialize_with = "flexible_opt_id")]
    pub property_id: Option<i64>,
    pub status: InquiryStatus,
    #[serde(alias = "created_at", alias = "createdAt")]
    pub date: Option<DateTime<Utc>>,
}

impl Record for Inquiry {
    const COLLECTION: &'static str = "inquiries";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_accepts_aliases() {
        assert_eq!(InquiryStatus::from_str("NEW"), Some(InquiryStatus::New));
        assert_eq!(InquiryStatus::from_str("unread"), Some(InquiryStatus::New));
        assert_eq!(
            InquiryStatus::try_from("responded"),
            Ok(InquiryStatus::Replied)
        );
        assert!(InquiryStatus::try_from("spam").is_err());
    }

    #[test]
    fn stored_rows_with_legacy_statuses_still_load() {
        let rows: Vec<Inquiry> = serde_json::from_str(
            r#"[{"id":1,"status":"unread"},{"id":2,"status":"New"},
                {"id":3,"status":"Responded"},{"id":4,"status":"spam"},{"id":5,"status":null}]"#,
        )
        .unwrap();
        let statuses: Vec<InquiryStatus> = rows.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                InquiryStatus::New,
                InquiryStatus::New,
                InquiryStatus::Replied,
                InquiryStatus::New,
                InquiryStatus::New,
            ]
        );
    }

    #[test]
    fn inquiry_defaults_to_new() {
        let i: Inquiry =
            serde_json::from_str(r#"{"id": 5, "name": "Ann", "propertyId": "12"}"#).unwrap();
        assert_eq!(i.status, InquiryStatus::New);
        assert_eq!(i.property_id, Some(12));
        assert_eq!(serde_json::to_value(i).unwrap()["status"], "new");
    }
}
