/// Patients registered at reception
use crate::models::{blank_as_none, date_from_any, optional_id, Entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Patient row. `doctor_id` is a weak reference to a doctor `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "date_from_any")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub doctor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub doctor_id: Option<String>,
}

/// Partial patient update. `doctor_id: Some(None)` unassigns the doctor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Option<String>>,
}

impl Entity for Patient {
    type Draft = NewPatient;
    type Patch = PatientPatch;

    const COLLECTION: &'static str = "patients";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewPatient) -> Self {
        Patient {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            date_of_birth: draft.date_of_birth,
            gender: draft.gender,
            address: draft.address,
            doctor_id: blank_as_none(draft.doctor_id),
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: &PatientPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(dob) = patch.date_of_birth {
            self.date_of_birth = dob;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        if let Some(doctor_id) = &patch.doctor_id {
            self.doctor_id = blank_as_none(doctor_id.clone());
        }
    }
}
