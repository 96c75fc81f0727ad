/// Form validation
///
/// Runs on the caller side before any collection mutation. Errors are
/// reported per field so the presentation layer can show them inline.
use crate::{
    error::ClinicError,
    models::{NewAppointment, NewMedicalRecord, NewPatient, NewUser, Patient, Role, User, UserPatch},
};
use chrono::NaiveTime;
use serde::Serialize;
use validator::ValidateEmail;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Validation result with detailed errors
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Collapse field errors into a single `ClinicError::Validation`
pub fn into_clinic_error(errors: &[ValidationError]) -> ClinicError {
    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    ClinicError::Validation(message)
}

/// Email address check
///
/// Requires a syntactically valid address with a dotted domain and no
/// whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) || !email.validate_email() {
        return false;
    }

    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .split_once('.')
                    .map_or(false, |(head, tail)| !head.is_empty() && !tail.is_empty())
        }
        None => false,
    }
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Whether another live user already holds `email`
///
/// Comparison ignores case and surrounding whitespace. `exclude_id` is the
/// row being edited, which may keep its own address.
pub fn email_taken(users: &[User], email: &str, exclude_id: Option<&str>) -> bool {
    let email = email.trim();
    users
        .iter()
        .filter(|u| Some(u.id.as_str()) != exclude_id)
        .any(|u| u.email.trim().eq_ignore_ascii_case(email))
}

#[derive(Default)]
struct Checks {
    errors: Vec<ValidationError>,
}

impl Checks {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, "Required");
            return false;
        }
        true
    }

    fn email(&mut self, field: &str, value: &str) -> bool {
        if !self.required(field, value) {
            return false;
        }
        if !is_valid_email(value.trim()) {
            self.fail(field, "Invalid email address");
            return false;
        }
        true
    }

    fn password(&mut self, field: &str, value: &str) {
        if !is_valid_password(value) {
            self.fail(
                field,
                format!("Must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
    }

    fn finish(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Sign-in form: email format and a non-empty password
pub fn validate_sign_in(email: &str, password: &str) -> ValidationResult {
    let mut checks = Checks::default();
    checks.email("email", email);
    if password.is_empty() {
        checks.fail("password", "Required");
    }
    checks.finish()
}

pub fn validate_change_password(current_password: &str, new_password: &str) -> ValidationResult {
    let mut checks = Checks::default();
    if current_password.is_empty() {
        checks.fail("currentPassword", "Required");
    }
    checks.password("newPassword", new_password);
    if !new_password.is_empty() && new_password == current_password {
        checks.fail("newPassword", "Must differ from the current password");
    }
    checks.finish()
}

/// New staff account, checked against the live user set
pub fn validate_new_user(draft: &NewUser, users: &[User]) -> ValidationResult {
    let mut checks = Checks::default();

    if checks.email("email", &draft.email) && email_taken(users, &draft.email, None) {
        checks.fail("email", "Email is already in use");
    }
    checks.required("firstName", &draft.first_name);
    checks.required("lastName", &draft.last_name);
    checks.password("temporaryPassword", &draft.temporary_password);

    checks.finish()
}

/// Edit of the user `id`; only fields present in the patch are checked
pub fn validate_user_patch(id: &str, patch: &UserPatch, users: &[User]) -> ValidationResult {
    let mut checks = Checks::default();

    if let Some(email) = &patch.email {
        if checks.email("email", email) && email_taken(users, email, Some(id)) {
            checks.fail("email", "Email is already in use");
        }
    }
    if let Some(first_name) = &patch.first_name {
        checks.required("firstName", first_name);
    }
    if let Some(last_name) = &patch.last_name {
        checks.required("lastName", last_name);
    }
    if let Some(name) = &patch.name {
        checks.required("name", name);
    }

    checks.finish()
}

/// Patient form; an assigned doctor must be a live doctor account
pub fn validate_patient(draft: &NewPatient, users: &[User]) -> ValidationResult {
    let mut checks = Checks::default();

    checks.required("name", &draft.name);
    checks.email("email", &draft.email);
    checks.required("phone", &draft.phone);
    checks.required("address", &draft.address);

    if let Some(doctor_id) = draft.doctor_id.as_deref() {
        if !is_doctor(users, doctor_id) {
            checks.fail("doctorId", "Unknown doctor");
        }
    }

    checks.finish()
}

/// Appointment form; both foreign keys must resolve
pub fn validate_appointment(
    draft: &NewAppointment,
    patients: &[Patient],
    users: &[User],
) -> ValidationResult {
    let mut checks = Checks::default();

    if checks.required("patientId", &draft.patient_id)
        && !patients.iter().any(|p| p.id == draft.patient_id)
    {
        checks.fail("patientId", "Unknown patient");
    }
    if checks.required("doctorId", &draft.doctor_id) && !is_doctor(users, &draft.doctor_id) {
        checks.fail("doctorId", "Unknown doctor");
    }
    if checks.required("time", &draft.time)
        && NaiveTime::parse_from_str(draft.time.trim(), "%H:%M").is_err()
    {
        checks.fail("time", "Expected HH:MM");
    }
    checks.required("type", &draft.appointment_type);

    checks.finish()
}

/// Medical record form
pub fn validate_record(draft: &NewMedicalRecord, patients: &[Patient]) -> ValidationResult {
    let mut checks = Checks::default();

    if checks.required("patientId", &draft.patient_id)
        && !patients.iter().any(|p| p.id == draft.patient_id)
    {
        checks.fail("patientId", "Unknown patient");
    }
    checks.required("doctorId", &draft.doctor_id);
    checks.required("diagnosis", &draft.diagnosis);
    checks.required("treatment", &draft.treatment);

    checks.finish()
}

fn is_doctor(users: &[User], id: &str) -> bool {
    users.iter().any(|u| u.id == id && u.role == Role::Doctor)
}
