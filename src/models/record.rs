/// Medical records written by doctors
use crate::models::{date_from_any, Entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(deserialize_with = "date_from_any")]
    pub date: NaiveDate,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalRecord {
    pub patient_id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for MedicalRecord {
    type Draft = NewMedicalRecord;
    type Patch = MedicalRecordPatch;

    const COLLECTION: &'static str = "records";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewMedicalRecord) -> Self {
        MedicalRecord {
            id,
            patient_id: draft.patient_id,
            doctor_id: draft.doctor_id,
            date: draft.date,
            diagnosis: draft.diagnosis,
            treatment: draft.treatment,
            prescription: draft.prescription,
            notes: draft.notes,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: &MedicalRecordPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(diagnosis) = &patch.diagnosis {
            self.diagnosis = diagnosis.clone();
        }
        if let Some(treatment) = &patch.treatment {
            self.treatment = treatment.clone();
        }
        if let Some(prescription) = &patch.prescription {
            self.prescription = Some(prescription.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
    }
}
