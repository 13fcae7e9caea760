use crate::db::{Db, StorageError};

use super::repo_types::{Appointment, AppointmentStatus, NewAppointment};

const COLUMNS: &str = "id, patient_id, doctor_id, date, time, reason, status";

impl Appointment {
    pub async fn list_all(db: &Db) -> Result<Vec<Appointment>, StorageError> {
        let sql = format!("SELECT {COLUMNS} FROM appointments ORDER BY date, time, id");
        db.fetch(&sql, &[]).await
    }

    pub async fn list_for_patient(db: &Db, patient_id: i64) -> Result<Vec<Appointment>, StorageError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM appointments WHERE patient_id = ? ORDER BY date, time, id"
        );
        db.fetch(&sql, &[patient_id.into()]).await
    }

    /// New appointments always start out `Pending`.
    pub async fn create(db: &Db, new: &NewAppointment) -> Result<u64, StorageError> {
        db.execute(
            r#"
            INSERT INTO appointments (patient_id, doctor_id, date, time, reason, status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            &[
                new.patient_id.into(),
                new.doctor_id.into(),
                new.date.as_str().into(),
                new.time.as_str().into(),
                new.reason.as_str().into(),
                AppointmentStatus::Pending.into(),
            ],
        )
        .await
    }

    pub async fn set_status(db: &Db, id: i64, status: AppointmentStatus) -> Result<u64, StorageError> {
        db.execute(
            "UPDATE appointments SET status = ? WHERE id = ?",
            &[status.into(), id.into()],
        )
        .await
    }

    pub async fn delete(db: &Db, id: i64) -> Result<u64, StorageError> {
        db.execute("DELETE FROM appointments WHERE id = ?", &[id.into()])
            .await
    }
}
