use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;

#[derive(Debug, Deserialize)]
pub struct RoleChangeForm {
    pub user_id: i64,
    pub new_role: String,
}

#[derive(Debug, Serialize)]
pub struct UserManagementView {
    pub users: Vec<User>,
}
