/// Canonical entity schemas
///
/// One tagged schema per entity kind. Every row is identified by an opaque
/// string id; foreign keys are plain ids that are never owned.

pub mod appointment;
pub mod patient;
pub mod record;
pub mod role;
pub mod user;

pub use appointment::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
pub use patient::{Gender, NewPatient, Patient, PatientPatch};
pub use record::{MedicalRecord, MedicalRecordPatch, NewMedicalRecord};
pub use role::Role;
pub use user::{NewUser, User, UserPatch};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// Contract every collection row satisfies
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Create input: the row minus `id` and `createdAt`
    type Draft: Serialize + Debug + Send + Sync + 'static;
    /// Partial update; `None` fields are left untouched
    type Patch: Serialize + Debug + Send + Sync + 'static;

    /// Collection name, also used as the storage key suffix
    const COLLECTION: &'static str;

    /// Version written alongside persisted rows
    const SCHEMA_VERSION: u32 = 1;

    fn id(&self) -> &str;

    /// Build a row from its draft with a generated id and timestamp
    fn from_draft(id: String, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Upgrade one stored row written at `from_version` to the current shape
    fn migrate_row(from_version: u32, row: Value) -> Value {
        let _ = from_version;
        row
    }
}

/// Generate a fresh opaque row id
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Accept ids serialized either as strings or as numbers
pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Optional foreign key; blank strings mean "not set"
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(blank_as_none(Option::<String>::deserialize(deserializer)?))
}

pub(crate) fn blank_as_none(id: Option<String>) -> Option<String> {
    id.filter(|id| !id.trim().is_empty())
}

/// Accept calendar dates either bare (`2024-06-03`) or as full RFC 3339
/// timestamps, keeping only the date part
pub(crate) fn date_from_any<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "id_from_any")]
        id: String,
    }

    #[derive(Deserialize)]
    struct Linked {
        #[serde(default, deserialize_with = "optional_id")]
        doctor_id: Option<String>,
    }

    #[derive(Deserialize)]
    struct Dated {
        #[serde(deserialize_with = "date_from_any")]
        date: NaiveDate,
    }

    #[test]
    fn test_date_from_date_or_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let d: Dated = serde_json::from_str(r#"{"date":"2024-06-03"}"#).unwrap();
        assert_eq!(d.date, expected);

        let d: Dated = serde_json::from_str(r#"{"date":"2024-06-03T10:15:00.000Z"}"#).unwrap();
        assert_eq!(d.date, expected);

        assert!(serde_json::from_str::<Dated>(r#"{"date":"June 3rd"}"#).is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_from_string_or_number() {
        let row: Row = serde_json::from_str(r#"{"id":"u1"}"#).unwrap();
        assert_eq!(row.id, "u1");

        let row: Row = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(row.id, "42");

        assert!(serde_json::from_str::<Row>(r#"{"id":null}"#).is_err());
    }

    #[test]
    fn test_blank_foreign_key_is_none() {
        for raw in [r#"{"doctor_id":""}"#, r#"{"doctor_id":"  "}"#, r#"{"doctor_id":null}"#, "{}"] {
            let row: Linked = serde_json::from_str(raw).unwrap();
            assert_eq!(row.doctor_id, None, "input {}", raw);
        }

        let row: Linked = serde_json::from_str(r#"{"doctor_id":"doc1"}"#).unwrap();
        assert_eq!(row.doctor_id.as_deref(), Some("doc1"));
    }
}
