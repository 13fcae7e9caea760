use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use tracing::{debug, warn};

use super::{principal::Principal, services::load_principal, session::session_id_from_headers};
use crate::state::AppState;

/// The logged-in user, loaded from storage on every request. Anonymous
/// requests are redirected to the login page.
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let to_login = || Redirect::to("/login");

        let session = session_id_from_headers(&parts.headers, &state.config.session)
            .ok_or_else(to_login)?;
        let user_id = state.sessions.resolve(&session).await.ok_or_else(to_login)?;

        match load_principal(&state.db, user_id).await {
            Ok(Some(p)) => Ok(CurrentUser(p)),
            Ok(None) => {
                debug!(user_id, "session refers to a deleted user");
                Err(to_login())
            }
            Err(e) => {
                warn!(error = %e, user_id, "principal lookup failed");
                Err(to_login())
            }
        }
    }
}
