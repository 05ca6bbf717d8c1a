use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
    #[serde(rename = "read-only")]
    ReadOnly,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[openapi(format = "uuid", validate = "required")]
    pub id: String,
    /// Display name shown
    /// in listings
    #[validate(required, length(min = 2, max = 50))]
    pub display_name: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub manager: Option<Box<User>>,
    #[serde(skip)]
    pub password_hash: String,
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(required, length(min = 2, max = 50))]
    pub display_name: String,
    #[validate(required, email)]
    pub email: String,
    #[openapi(one_of = "admin member", default = "member")]
    pub role: String,
    #[validate(range(min = 13, max = 130))]
    #[openapi(example = "30")]
    pub age: u8,
}

#[derive(Debug, Serialize)]
pub struct Category {
    pub name: String,
    pub parent: Option<Box<Self>>,
    pub children: Vec<Self>,
}
