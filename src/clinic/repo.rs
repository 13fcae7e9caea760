use crate::db::{Db, Statement, StorageError};

use super::repo_types::{Department, Doctor, NewDoctor, NewPatient, Patient, TimeSlot};

impl Department {
    pub async fn list(db: &Db) -> Result<Vec<Department>, StorageError> {
        db.fetch("SELECT id, name FROM departments ORDER BY name", &[])
            .await
    }

    pub async fn create(db: &Db, name: &str) -> Result<u64, StorageError> {
        db.execute("INSERT INTO departments (name) VALUES (?)", &[name.into()])
            .await
    }
}

impl Doctor {
    pub async fn list(db: &Db) -> Result<Vec<Doctor>, StorageError> {
        db.fetch(
            "SELECT id, name, specialty, contact FROM doctors ORDER BY id",
            &[],
        )
        .await
    }

    pub async fn create(db: &Db, doctor: &NewDoctor) -> Result<u64, StorageError> {
        db.execute(
            r#"
            INSERT INTO doctors (name, specialty, contact)
            VALUES (?, ?, ?)
            "#,
            &[
                doctor.name.as_str().into(),
                doctor.specialty.as_str().into(),
                doctor.contact.as_str().into(),
            ],
        )
        .await
    }

    pub async fn delete(db: &Db, id: i64) -> Result<u64, StorageError> {
        db.execute("DELETE FROM doctors WHERE id = ?", &[id.into()])
            .await
    }
}

impl TimeSlot {
    pub async fn list(db: &Db) -> Result<Vec<TimeSlot>, StorageError> {
        db.fetch("SELECT id, time FROM available_time_slots ORDER BY id", &[])
            .await
    }

    /// Replaces the whole slot set in one transaction.
    pub async fn replace_all(db: &Db, slots: &[String]) -> Result<(), StorageError> {
        let mut batch = Vec::with_capacity(slots.len() + 1);
        batch.push(Statement::new("DELETE FROM available_time_slots", vec![]));
        batch.extend(slots.iter().map(|slot| {
            Statement::new(
                "INSERT INTO available_time_slots (time) VALUES (?)",
                vec![slot.as_str().into()],
            )
        }));
        db.execute_atomic(&batch).await?;
        Ok(())
    }
}

impl Patient {
    pub async fn list(db: &Db) -> Result<Vec<Patient>, StorageError> {
        db.fetch(
            "SELECT id, name, dob, age, gender, contact FROM patients ORDER BY id",
            &[],
        )
        .await
    }

    pub async fn create(db: &Db, p: &NewPatient) -> Result<u64, StorageError> {
        db.execute(
            r#"
            INSERT INTO patients (name, dob, age, gender, contact)
            VALUES (?, ?, ?, ?, ?)
            "#,
            &[
                p.name.as_str().into(),
                p.dob.as_str().into(),
                p.age.into(),
                p.gender.as_str().into(),
                p.contact.as_str().into(),
            ],
        )
        .await
    }

    pub async fn delete(db: &Db, id: i64) -> Result<u64, StorageError> {
        db.execute("DELETE FROM patients WHERE id = ?", &[id.into()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn slots(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn slot_replacement_is_wholesale() {
        let (db, _dir) = test_db::fresh().await;
        TimeSlot::replace_all(&db, &slots(&["09:00", "10:00"])).await.unwrap();
        TimeSlot::replace_all(&db, &slots(&["11:00"])).await.unwrap();

        let times: Vec<String> = TimeSlot::list(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.time)
            .collect();
        assert_eq!(times, vec!["11:00".to_string()]);
    }

    #[tokio::test]
    async fn failed_replacement_keeps_previous_set() {
        let (db, _dir) = test_db::fresh().await;
        TimeSlot::replace_all(&db, &slots(&["09:00"])).await.unwrap();
        let err = TimeSlot::replace_all(&db, &slots(&["10:00", "10:00"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        let times: Vec<String> = TimeSlot::list(&db).await.unwrap().into_iter().map(|s| s.time).collect();
        assert_eq!(times, vec!["09:00".to_string()]);
    }

    #[tokio::test]
    async fn department_names_are_unique() {
        let (db, _dir) = test_db::fresh().await;
        Department::create(&db, "Radiology").await.unwrap();
        let err = Department::create(&db, "Radiology").await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert_eq!(Department::list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn doctor_and_patient_crud() {
        let (db, _dir) = test_db::fresh().await;
        Doctor::create(
            &db,
            &NewDoctor {
                name: "Dr. House".into(),
                specialty: "Diagnostics".into(),
                contact: "555-0100".into(),
            },
        )
        .await
        .unwrap();
        let doctors = Doctor::list(&db).await.unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(Doctor::delete(&db, doctors[0].id).await.unwrap(), 1);
        assert!(Doctor::list(&db).await.unwrap().is_empty());

        Patient::create(
            &db,
            &NewPatient {
                name: "Jane".into(),
                dob: "1990-04-01".into(),
                age: 35,
                gender: "F".into(),
                contact: "555-0199".into(),
            },
        )
        .await
        .unwrap();
        let patients = Patient::list(&db).await.unwrap();
        assert_eq!(patients[0].age, 35);
        assert_eq!(Patient::delete(&db, patients[0].id).await.unwrap(), 1);
    }
}
