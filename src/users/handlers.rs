use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Form, Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{RoleChangeForm, UserManagementView};
use crate::{
    auth::{
        guard::{require, Action, Resource},
        repo_types::User,
        CurrentUser, Role,
    },
    error::AppError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user_management", get(user_management).post(change_role))
        .route("/delete/:id", get(delete_user))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn user_management(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserManagementView>, AppError> {
    require(&user, Resource::User, Action::Read)?;
    Ok(Json(UserManagementView {
        users: User::list(&state.db).await?,
    }))
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn change_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<RoleChangeForm>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::User, Action::Update)?;
    let role = form
        .new_role
        .parse::<Role>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let n = User::update_role(&state.db, form.user_id, role).await?;
    debug!(target_user = form.user_id, %role, updated = n, "user role changed");
    Ok(Redirect::to("/user_management"))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    require(&user, Resource::User, Action::Delete)?;
    let n = User::delete(&state.db, id).await?;
    debug!(target_user = id, deleted = n, "user deleted");
    Ok(Redirect::to("/user_management"))
}
