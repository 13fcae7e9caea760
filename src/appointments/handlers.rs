use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{debug, info, instrument};

use super::{
    dto::{BookForm, BookingView, ManageForm},
    repo_types::{Appointment, NewAppointment},
    services::{reason_or_default, status_for_action},
};
use crate::{
    auth::{
        guard::{require, Action, Resource},
        CurrentUser,
    },
    clinic::{Department, Doctor, TimeSlot},
    error::AppError,
    state::AppState,
    validation::{is_calendar_date, non_blank},
};

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/book_appointment", get(booking_page).post(book))
        .route("/manage_appointments", post(manage))
        .route("/delete_appointment/:id", post(delete_appointment))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn booking_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<BookingView>, AppError> {
    require(&user, Resource::Appointment, Action::Create)?;
    Ok(Json(BookingView {
        departments: Department::list(&state.db).await?,
        doctors: Doctor::list(&state.db).await?,
        available_slots: TimeSlot::list(&state.db).await?,
    }))
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<BookForm>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::Appointment, Action::Create)?;

    if !is_calendar_date(form.date.trim()) {
        return Err(AppError::BadRequest("Date must be YYYY-MM-DD".into()));
    }
    let time = non_blank(&form.time)
        .ok_or_else(|| AppError::BadRequest("Time is required".into()))?;

    let new = NewAppointment {
        patient_id: user.id,
        doctor_id: form.doctor,
        date: form.date.trim().to_string(),
        time,
        reason: reason_or_default(form.reason.as_deref()),
    };
    Appointment::create(&state.db, &new).await?;
    info!(doctor_id = new.doctor_id, date = %new.date, time = %new.time, "appointment booked");
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn manage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ManageForm>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::AppointmentStatus, Action::Update)?;

    match status_for_action(&form.action) {
        Some(status) => {
            let n = Appointment::set_status(&state.db, form.appointment_id, status).await?;
            debug!(appointment_id = form.appointment_id, ?status, updated = n, "appointment status changed");
        }
        None => debug!(action = %form.action, "ignoring unknown appointment action"),
    }
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_appointment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::Appointment, Action::Delete)?;
    let n = Appointment::delete(&state.db, id).await?;
    debug!(appointment_id = id, deleted = n, "appointment deleted");
    Ok(Redirect::to("/"))
}
