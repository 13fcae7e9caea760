use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use crate::{
    appointments::Appointment,
    auth::{
        guard::{allows, require, Action, Resource},
        repo_types::User,
        CurrentUser, Principal,
    },
    clinic::{Doctor, Patient},
    error::AppError,
    state::AppState,
};

/// Role-scoped dashboard. Non-admins get their own appointments only and
/// empty patient and user lists.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: Principal,
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub users: Vec<User>,
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Dashboard>, AppError> {
    require(&user, Resource::Appointment, Action::Read)?;
    let db = &state.db;

    let doctors = Doctor::list(db).await?;
    let dashboard = if allows(&user, Resource::Patient, Action::Read) {
        Dashboard {
            patients: Patient::list(db).await?,
            doctors,
            appointments: Appointment::list_all(db).await?,
            users: User::list(db).await?,
            user,
        }
    } else {
        Dashboard {
            patients: Vec::new(),
            doctors,
            appointments: Appointment::list_for_patient(db, user.id).await?,
            users: Vec::new(),
            user,
        }
    };
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        appointments::services::DEFAULT_REASON,
        test_support::{self as ts, TestApp},
    };

    async fn book(t: &TestApp, cookie: &str, date: &str) {
        let body = format!("doctor=1&date={date}&time=10%3A00&reason=");
        let res = t.post("/book_appointment", &body, Some(cookie)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn listing_is_role_scoped() {
        let t = TestApp::new().await;
        let admin = t.admin().await;
        t.post(
            "/admin_setup",
            "doctor_name=Dr.+A&specialty=GP&contact=1",
            Some(&admin),
        )
        .await;
        t.post(
            "/add_patient",
            "name=Jane&dob=1990-01-01&age=35&gender=F&contact=2",
            Some(&admin),
        )
        .await;
        let alice = t.patient("alice").await;
        let bob = t.patient("bob").await;
        book(&t, &alice, "2025-01-01").await;
        book(&t, &bob, "2025-01-02").await;
        book(&t, &bob, "2025-01-03").await;

        let view = ts::json(t.get("/", Some(&admin)).await).await;
        assert_eq!(view["user"]["role"], "admin");
        assert_eq!(view["patients"].as_array().unwrap().len(), 1);
        assert_eq!(view["doctors"].as_array().unwrap().len(), 1);
        assert_eq!(view["appointments"].as_array().unwrap().len(), 3);
        assert_eq!(view["users"].as_array().unwrap().len(), 3);
        assert!(view["users"][0].get("password_hash").is_none());

        let view = ts::json(t.get("/", Some(&bob)).await).await;
        let alice_id = ts::json(t.get("/", Some(&alice)).await).await["user"]["id"].clone();
        assert_eq!(view["patients"].as_array().unwrap().len(), 0);
        assert_eq!(view["users"].as_array().unwrap().len(), 0);
        assert_eq!(view["doctors"].as_array().unwrap().len(), 1);
        let appts = view["appointments"].as_array().unwrap();
        assert_eq!(appts.len(), 2);
        assert!(appts.iter().all(|a| a["patient_id"] == view["user"]["id"]));
        assert!(appts.iter().all(|a| a["patient_id"] != alice_id));
    }

    #[tokio::test]
    async fn register_login_book_end_to_end() {
        let t = TestApp::new().await;
        let admin = t.admin().await;
        t.post(
            "/admin_setup",
            "doctor_name=Dr.+A&specialty=GP&contact=1",
            Some(&admin),
        )
        .await;

        t.register("alice", "pw1", "patient").await;
        let alice = t.login("alice", "pw1").await;
        let res = t
            .post(
                "/book_appointment",
                "doctor=1&date=2025-01-01&time=10%3A00&reason=",
                Some(&alice),
            )
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = t.get("/", Some(&alice)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let view = ts::json(res).await;
        assert_eq!(view["user"]["username"], "alice");
        let appts = view["appointments"].as_array().unwrap();
        assert_eq!(appts.len(), 1);
        assert_eq!(appts[0]["status"], "Pending");
        assert_eq!(appts[0]["reason"], DEFAULT_REASON);
        assert_eq!(appts[0]["date"], "2025-01-01");
        assert_eq!(appts[0]["time"], "10:00");
    }
}
