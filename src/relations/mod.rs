/// Cross-collection joins
///
/// `RelationalIndex` works over snapshots of the four collections and never
/// fails: a foreign key that does not resolve yields a sentinel label.
use crate::{
    models::{Appointment, AppointmentStatus, MedicalRecord, Patient, Role, User},
    store::{AppointmentCollection, PatientCollection, RecordCollection, UserCollection},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

/// Label for a foreign key with no live row behind it
pub const UNKNOWN: &str = "Unknown";

/// Label for a patient with no doctor assigned
pub const NOT_ASSIGNED: &str = "Not Assigned";

/// Inclusive Sunday-to-Saturday week containing `date`
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    let start = date - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// Appointment row with resolved names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: String,
    pub patient_name: String,
    pub doctor_label: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Medical record row with resolved names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: String,
    pub patient_name: String,
    pub doctor_label: String,
    pub date: NaiveDate,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: Option<String>,
}

/// Per-doctor counts shown on the reception dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorWorkload {
    pub doctor_id: String,
    pub label: String,
    pub email: String,
    pub patient_count: usize,
    pub appointment_count: usize,
}

/// Lookup helpers over collection snapshots
#[derive(Debug, Clone, Default)]
pub struct RelationalIndex {
    users: Arc<Vec<User>>,
    patients: Arc<Vec<Patient>>,
    appointments: Arc<Vec<Appointment>>,
    records: Arc<Vec<MedicalRecord>>,
}

impl RelationalIndex {
    pub fn new(
        users: Arc<Vec<User>>,
        patients: Arc<Vec<Patient>>,
        appointments: Arc<Vec<Appointment>>,
        records: Arc<Vec<MedicalRecord>>,
    ) -> Self {
        Self {
            users,
            patients,
            appointments,
            records,
        }
    }

    /// Snapshot the current state of every collection
    pub fn from_collections(
        users: &UserCollection,
        patients: &PatientCollection,
        appointments: &AppointmentCollection,
        records: &RecordCollection,
    ) -> Self {
        Self::new(
            users.snapshot(),
            patients.snapshot(),
            appointments.snapshot(),
            records.snapshot(),
        )
    }

    pub fn patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == patient_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn resolve_patient_name(&self, patient_id: &str) -> String {
        self.patient(patient_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Doctor display name; `NOT_ASSIGNED` for no id, `UNKNOWN` for a dangling id
    pub fn resolve_doctor_name(&self, doctor_id: Option<&str>) -> String {
        match doctor_id.filter(|id| !id.trim().is_empty()) {
            None => NOT_ASSIGNED.to_string(),
            Some(id) => self
                .user(id)
                .map(User::display_name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// `Dr. {name}` when the doctor resolves, otherwise the sentinel
    pub fn doctor_label(&self, doctor_id: Option<&str>) -> String {
        match doctor_id.and_then(|id| self.user(id)) {
            Some(doctor) => format!("Dr. {}", doctor.display_name()),
            None => self.resolve_doctor_name(doctor_id),
        }
    }

    pub fn doctors(&self) -> Vec<User> {
        self.users
            .iter()
            .filter(|u| u.role == Role::Doctor)
            .cloned()
            .collect()
    }

    pub fn patients_for_doctor(&self, doctor_id: &str) -> Vec<Patient> {
        if doctor_id.trim().is_empty() {
            return Vec::new();
        }
        self.patients
            .iter()
            .filter(|p| p.doctor_id.as_deref() == Some(doctor_id))
            .cloned()
            .collect()
    }

    pub fn appointments_for_doctor(&self, doctor_id: &str) -> Vec<Appointment> {
        self.appointments_where(|a| a.doctor_id == doctor_id)
    }

    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.appointments_where(|a| a.patient_id == patient_id)
    }

    /// Appointments dated within `start..=end`
    pub fn appointments_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Appointment> {
        self.appointments_where(|a| a.date >= start && a.date <= end)
    }

    /// Appointments on `date`, optionally for one doctor
    pub fn appointments_on(&self, date: NaiveDate, doctor_id: Option<&str>) -> Vec<Appointment> {
        self.appointments_where(|a| {
            a.date == date && doctor_id.map_or(true, |id| a.doctor_id == id)
        })
    }

    /// Appointments in the week containing `today`, optionally for one doctor
    pub fn this_week_appointments(
        &self,
        today: NaiveDate,
        doctor_id: Option<&str>,
    ) -> Vec<Appointment> {
        let (start, end) = week_range(today);
        self.appointments_where(|a| {
            a.date >= start && a.date <= end && doctor_id.map_or(true, |id| a.doctor_id == id)
        })
    }

    pub fn records_for_patient(&self, patient_id: &str) -> Vec<MedicalRecord> {
        self.records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect()
    }

    pub fn records_for_doctor(&self, doctor_id: &str) -> Vec<MedicalRecord> {
        self.records
            .iter()
            .filter(|r| r.doctor_id == doctor_id)
            .cloned()
            .collect()
    }

    /// Patient and appointment counts for every doctor
    pub fn doctor_workloads(&self) -> Vec<DoctorWorkload> {
        self.users
            .iter()
            .filter(|u| u.role == Role::Doctor)
            .map(|doctor| DoctorWorkload {
                doctor_id: doctor.id.clone(),
                label: format!("Dr. {}", doctor.display_name()),
                email: doctor.email.clone(),
                patient_count: self
                    .patients
                    .iter()
                    .filter(|p| p.doctor_id.as_deref() == Some(doctor.id.as_str()))
                    .count(),
                appointment_count: self
                    .appointments
                    .iter()
                    .filter(|a| a.doctor_id == doctor.id)
                    .count(),
            })
            .collect()
    }

    pub fn appointment_views(&self, appointments: &[Appointment]) -> Vec<AppointmentView> {
        appointments
            .iter()
            .map(|a| AppointmentView {
                id: a.id.clone(),
                patient_name: self.resolve_patient_name(&a.patient_id),
                doctor_label: self.doctor_label(Some(&a.doctor_id)),
                date: a.date,
                time: a.time.clone(),
                appointment_type: a.appointment_type.clone(),
                status: a.status,
                notes: a.notes.clone(),
            })
            .collect()
    }

    pub fn record_views(&self, records: &[MedicalRecord]) -> Vec<RecordView> {
        records
            .iter()
            .map(|r| RecordView {
                id: r.id.clone(),
                patient_name: self.resolve_patient_name(&r.patient_id),
                doctor_label: self.doctor_label(Some(&r.doctor_id)),
                date: r.date,
                diagnosis: r.diagnosis.clone(),
                treatment: r.treatment.clone(),
                prescription: r.prescription.clone(),
            })
            .collect()
    }

    fn appointments_where<F>(&self, predicate: F) -> Vec<Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        self.appointments
            .iter()
            .filter(|a| predicate(a))
            .cloned()
            .collect()
    }
}
