use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::Param;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Declined,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Declined => "Declined",
        }
    }
}

impl From<AppointmentStatus> for Param {
    fn from(s: AppointmentStatus) -> Self {
        Param::Text(s.as_str().to_string())
    }
}

/// Appointment record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64, // users.id of the booking account
    pub doctor_id: i64,
    pub date: String,
    pub time: String,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: String,
    pub time: String,
    pub reason: String,
}
