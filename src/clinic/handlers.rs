use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{debug, instrument};

use super::{
    dto::{AddPatientForm, AdminSetupForm, AdminSetupView, SUGGESTED_TIMES},
    repo_types::{Department, Doctor, NewPatient, Patient, TimeSlot},
};
use crate::{
    auth::{
        guard::{require, require_all, Action, Resource},
        CurrentUser,
    },
    error::AppError,
    state::AppState,
    validation::{is_calendar_date, non_blank},
};

const SETUP_CAPS: [(Resource, Action); 3] = [
    (Resource::Department, Action::Create),
    (Resource::Doctor, Action::Create),
    (Resource::TimeSlot, Action::Update),
];

pub fn clinic_routes() -> Router<AppState> {
    Router::new()
        .route("/admin_setup", get(admin_setup_page).post(admin_setup))
        .route("/add_patient", post(add_patient))
        .route("/delete_patient/:id", post(delete_patient))
        .route("/delete_doctor/:id", post(delete_doctor))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn admin_setup_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AdminSetupView>, AppError> {
    require_all(&user, &SETUP_CAPS)?;
    Ok(Json(AdminSetupView {
        suggested_times: &SUGGESTED_TIMES,
        departments: Department::list(&state.db).await?,
        time_slots: TimeSlot::list(&state.db).await?,
    }))
}

#[instrument(skip(state, user, pairs), fields(user_id = user.id))]
pub async fn admin_setup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    require_all(&user, &SETUP_CAPS)?;
    let form = AdminSetupForm::from_pairs(pairs);

    if let Some(name) = &form.department_name {
        debug!(department = %name, "adding department");
        Department::create(&state.db, name).await?;
    }
    if let Some(doctor) = &form.doctor {
        debug!(doctor = %doctor.name, specialty = %doctor.specialty, "adding doctor");
        Doctor::create(&state.db, doctor).await?;
    }
    if let Some(slots) = &form.time_slots {
        debug!(?slots, "replacing time slots");
        TimeSlot::replace_all(&state.db, slots).await?;
    }

    Ok(Redirect::to("/admin_setup"))
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn add_patient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<AddPatientForm>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::Patient, Action::Create)?;

    let missing = || AppError::BadRequest("All patient fields are required".into());
    let patient = NewPatient {
        name: non_blank(&form.name).ok_or_else(missing)?,
        dob: non_blank(&form.dob).ok_or_else(missing)?,
        age: form.age,
        gender: non_blank(&form.gender).ok_or_else(missing)?,
        contact: non_blank(&form.contact).ok_or_else(missing)?,
    };
    if !is_calendar_date(&patient.dob) {
        return Err(AppError::BadRequest("Date of birth must be YYYY-MM-DD".into()));
    }
    if !(0..=150).contains(&patient.age) {
        return Err(AppError::BadRequest("Age is out of range".into()));
    }

    debug!(patient = %patient.name, "adding patient");
    Patient::create(&state.db, &patient).await?;
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_patient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::Patient, Action::Delete)?;
    let n = Patient::delete(&state.db, id).await?;
    debug!(patient_id = id, deleted = n, "patient deleted");
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_doctor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::Doctor, Action::Delete)?;
    let n = Doctor::delete(&state.db, id).await?;
    debug!(doctor_id = id, deleted = n, "doctor deleted");
    Ok(Redirect::to("/"))
}
