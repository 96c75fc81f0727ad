/// Collection behaviour through the application context

mod common;

#[cfg(test)]
mod tests {
    use super::common::{context, StubServer, ADMIN_EMAIL, ADMIN_PASSWORD};
    use chrono::NaiveDate;
    use clinic_core::{
        config::UsersBacking,
        models::{
            AppointmentStatus, Gender, NewAppointment, NewPatient, NewUser, Patient, Role,
            UserPatch,
        },
        relations::{NOT_ASSIGNED, UNKNOWN},
        storage::{decode_rows, FileStore, KeyValueStore, MemoryStore},
        validation, FailureKind, Outcome,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn jane() -> NewPatient {
        NewPatient {
            name: "Jane Doe".to_string(),
            email: "jane@mail.test".to_string(),
            phone: "555-0100".to_string(),
            date_of_birth: date("1990-04-12"),
            gender: Gender::Female,
            address: "1 Main St".to_string(),
            doctor_id: Some("doc1".to_string()),
        }
    }

    fn appointment(patient_id: &str, day: &str) -> NewAppointment {
        NewAppointment {
            patient_id: patient_id.to_string(),
            doctor_id: "doc1".to_string(),
            date: date(day),
            time: "10:00".to_string(),
            appointment_type: "Checkup".to_string(),
            status: AppointmentStatus::Scheduled,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_local_patient_create_scenario() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context(store.clone(), StubServer::new(), UsersBacking::Remote).await;

        let created = ctx.patients.create(jane()).await.unwrap();

        let all = ctx.patients.snapshot();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Jane Doe");
        assert!(!all[0].id.is_empty());
        assert_eq!(all[0], created);

        let raw = store.get("medtech-patients").unwrap().unwrap();
        assert_eq!(decode_rows::<Patient>(&raw).rows, *all);
    }

    #[tokio::test]
    async fn test_week_view_scenario() {
        let ctx = context(Arc::new(MemoryStore::new()), StubServer::new(), UsersBacking::Remote).await;
        let patient = ctx.patients.create(jane()).await.unwrap();

        let monday = ctx
            .appointments
            .create(appointment(&patient.id, "2024-06-03"))
            .await
            .unwrap();
        ctx.appointments
            .create(appointment(&patient.id, "2024-06-10"))
            .await
            .unwrap();

        let week = ctx.index().this_week_appointments(date("2024-06-05"), Some("doc1"));
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].id, monday.id);
    }

    #[tokio::test]
    async fn test_remote_update_failure_scenario() {
        let server = StubServer::new();
        let ctx = context(Arc::new(MemoryStore::new()), server.clone(), UsersBacking::Remote).await;
        ctx.session.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        ctx.users.refresh().await.unwrap();

        let before = serde_json::to_vec(&*ctx.users.snapshot()).unwrap();

        server.set_failing(true);
        let patch = UserPatch {
            first_name: Some("Gregory".to_string()),
            ..Default::default()
        };
        let outcome = Outcome::from(ctx.users.update("doc1", &patch).await);

        let after = serde_json::to_vec(&*ctx.users.snapshot()).unwrap();
        assert_eq!(before, after);

        let report = outcome.failure().unwrap();
        assert!(!report.ok);
        assert_eq!(report.kind, FailureKind::Persistence);
    }

    #[tokio::test]
    async fn test_remote_user_lifecycle_with_validation() {
        let server = StubServer::new();
        let ctx = context(Arc::new(MemoryStore::new()), server.clone(), UsersBacking::Remote).await;
        ctx.session.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        ctx.users.refresh().await.unwrap();

        let duplicate = NewUser {
            email: "DOC1@clinic.test".to_string(),
            first_name: "Dup".to_string(),
            last_name: "Licate".to_string(),
            role: Role::Doctor,
            temporary_password: "changeme1".to_string(),
        };
        assert!(validation::validate_new_user(&duplicate, &ctx.users.snapshot()).is_err());

        let draft = NewUser {
            email: "cuddy@clinic.test".to_string(),
            ..duplicate
        };
        validation::validate_new_user(&draft, &ctx.users.snapshot()).unwrap();
        let created = ctx.users.create(draft).await.unwrap();
        assert!(created.must_change_password);
        assert_eq!(ctx.users.doctors().len(), 2);

        assert!(ctx.users.delete(&created.id).await.unwrap());
        assert!(!ctx.users.delete("no-such-user").await.unwrap());
        assert_eq!(ctx.users.len(), 2);
        assert!(server
            .calls()
            .iter()
            .all(|call| !call.contains("no-such-user")));
    }

    #[tokio::test]
    async fn test_dangling_doctor_resolves_to_sentinel() {
        let server = StubServer::new();
        let ctx = context(Arc::new(MemoryStore::new()), server.clone(), UsersBacking::Remote).await;
        ctx.session.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        ctx.users.refresh().await.unwrap();

        let patient = ctx.patients.create(jane()).await.unwrap();
        let mut unassigned = jane();
        unassigned.doctor_id = None;
        let other = ctx.patients.create(unassigned).await.unwrap();

        assert_eq!(ctx.index().doctor_label(patient.doctor_id.as_deref()), "Dr. Greg House");

        // Deleting the doctor leaves the patient pointing at nobody
        ctx.users.delete("doc1").await.unwrap();
        let index = ctx.index();
        assert_eq!(index.resolve_doctor_name(patient.doctor_id.as_deref()), UNKNOWN);
        assert_eq!(index.resolve_doctor_name(other.doctor_id.as_deref()), NOT_ASSIGNED);
        assert_eq!(ctx.patients.by_doctor("doc1").len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_file_data_is_migrated() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());

        // Historical formats: bare arrays, plaintext passwords, full timestamps
        store
            .set(
                "medtech-users",
                r#"[{"id":"abc","email":"old@clinic.test","password":"secret","role":"Reception","name":"Rita Desk","createdAt":"2023-01-01T00:00:00.000Z"}]"#,
            )
            .unwrap();
        store
            .set(
                "medtech-records",
                r#"[{"id":"r1","patientId":"p1","doctorId":"doc1","date":"2024-06-03T09:12:00.000Z","diagnosis":"Flu","treatment":"Rest","createdAt":"2024-06-03T09:12:00.000Z"}]"#,
            )
            .unwrap();
        store.set("medtech-patients", "{not json").unwrap();

        let ctx = context_on_file(store.clone()).await;

        let users = ctx.users.snapshot();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Reception);
        assert_eq!(users[0].display_name(), "Rita Desk");
        assert!(!store.get("medtech-users").unwrap().unwrap().contains("secret"));

        assert_eq!(ctx.records.snapshot()[0].date, date("2024-06-03"));
        assert!(ctx.patients.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_bytes_start_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("medtech-patients.json"), [0xff, 0xfe, 0x00]).unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());

        let ctx = context_on_file(store).await;
        assert!(ctx.patients.is_empty());

        ctx.patients.create(jane()).await.unwrap();
        assert_eq!(ctx.patients.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_legacy_doctor_is_unassigned() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());
        store
            .set(
                "medtech-patients",
                r#"[{"id":"p1","name":"Walk In","email":"walk@mail.test","phone":"555","dateOfBirth":"1980-01-01","gender":"male","address":"2 Side St","doctorId":"","createdAt":"2024-06-01T10:00:00.000Z"}]"#,
            )
            .unwrap();

        let ctx = context_on_file(store).await;
        let patient = &ctx.patients.snapshot()[0];
        assert_eq!(patient.doctor_id, None);
        assert_eq!(ctx.index().doctor_label(patient.doctor_id.as_deref()), NOT_ASSIGNED);
        assert!(ctx.index().patients_for_doctor("").is_empty());
    }

    async fn context_on_file(store: Arc<FileStore>) -> clinic_core::AppContext {
        let mut config = clinic_core::ClientConfig::default();
        config.storage.users_backing = UsersBacking::Local;
        let server = StubServer::new();
        clinic_core::AppContext::with_backends(config, store, server.clone(), server)
            .await
            .unwrap()
    }
}
