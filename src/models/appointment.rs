/// Appointments between a patient and a doctor
use crate::models::{date_from_any, Entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(deserialize_with = "date_from_any")]
    pub date: NaiveDate,
    /// Wall-clock time as entered, e.g. `09:30`
    pub time: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Appointment {
    type Draft = NewAppointment;
    type Patch = AppointmentPatch;

    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewAppointment) -> Self {
        Appointment {
            id,
            patient_id: draft.patient_id,
            doctor_id: draft.doctor_id,
            date: draft.date,
            time: draft.time,
            appointment_type: draft.appointment_type,
            status: draft.status,
            notes: draft.notes,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: &AppointmentPatch) {
        if let Some(patient_id) = &patch.patient_id {
            self.patient_id = patient_id.clone();
        }
        if let Some(doctor_id) = &patch.doctor_id {
            self.doctor_id = doctor_id.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = &patch.time {
            self.time = time.clone();
        }
        if let Some(kind) = &patch.appointment_type {
            self.appointment_type = kind.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
    }
}
