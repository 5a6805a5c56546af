use serde::{Deserialize, Serialize};

use crate::domain::meta::MetaCollection;

/// Пользователь (`wp_users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub email: String,

    #[serde(rename = "displayName")]
    pub display_name: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<MetaCollection>,
}

impl User {
    pub fn new_for_insert(login: String, email: String) -> Self {
        Self {
            id: 0,
            display_name: login.clone(),
            login,
            email,
            meta: None,
        }
    }
}
