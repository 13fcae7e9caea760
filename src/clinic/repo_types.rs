use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct TimeSlot {
    pub id: i64,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub dob: String,
    pub age: i64,
    pub gender: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub dob: String,
    pub age: i64,
    pub gender: String,
    pub contact: String,
}
