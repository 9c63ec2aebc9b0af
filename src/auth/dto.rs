use serde::{Deserialize, Serialize};

use crate::extract::present;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// OAuth2 password-flow form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Absent fields are left alone; `"full_name": null` or `""` clears the name.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default, deserialize_with = "present")]
    pub full_name: Option<Option<String>>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_absent_null_and_set_are_distinct() {
        let absent: UpdateMeRequest = serde_json::from_str(r#"{"password": "x"}"#).unwrap();
        assert_eq!(absent.full_name, None);

        let null: UpdateMeRequest = serde_json::from_str(r#"{"full_name": null}"#).unwrap();
        assert_eq!(null.full_name, Some(None));

        let set: UpdateMeRequest = serde_json::from_str(r#"{"full_name": "Ada"}"#).unwrap();
        assert_eq!(set.full_name, Some(Some("Ada".into())));
    }
}
