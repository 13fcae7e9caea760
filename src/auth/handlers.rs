use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect},
    routing::get,
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        extractors::CurrentUser,
        principal::Role,
        services,
        session::{expired_cookie, session_cookie, session_id_from_headers},
    },
    error::{AppError, Page},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_page).post(register))
}

pub async fn login_page() -> Json<Page> {
    Json(Page::new("Login"))
}

pub async fn register_page() -> Json<Page> {
    Json(Page::new("Register"))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let principal = services::authenticate(&state.db, &form.username, &form.password).await?;
    let session = state.sessions.create(principal.id).await;
    let cookie = session_cookie(&state.config.session, &session);
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")))
}

#[instrument(skip(state, headers, user), fields(user_id = user.id))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(session) = session_id_from_headers(&headers, &state.config.session) {
        state.sessions.destroy(&session).await;
    }
    info!("user logged out");
    (
        [(SET_COOKIE, expired_cookie(&state.config.session))],
        Redirect::to("/login"),
    )
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let role = form
        .role
        .parse::<Role>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    services::register(&state.db, &form.username, &form.password, role).await?;
    Ok(Redirect::to("/login"))
}
