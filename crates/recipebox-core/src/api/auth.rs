//! Auth resource over HTTP.

use super::http::{check, endpoint, read_json, HttpClient};
use super::AuthApi;
use crate::error::{ApiError, Result};
use crate::models::{AuthReply, SignUp, User};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ConfirmSignUp<'a> {
    username: &'a str,
    confirmationcode: &'a str,
}

#[derive(Serialize)]
struct ForgotPassword<'a> {
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmForgotPassword<'a> {
    username: &'a str,
    confirmation_code: &'a str,
    new_password: &'a str,
}

/// Rewrite identity-provider errors into something a person can act on.
pub fn friendly_sign_up_message(message: &str) -> String {
    if message.contains("Password did not conform with policy") {
        "Password must contain: uppercase letter, lowercase letter, number, and special character (!@#$%^&*)".to_string()
    } else if message.contains("An account with the given email already exists") {
        "An account with this email already exists. Try signing in instead.".to_string()
    } else if message.contains("Username should be an email") {
        "Please use a valid email format for your username".to_string()
    } else {
        message.to_string()
    }
}

/// Pull the user out of a status-check body.
///
/// Accepts either the user object itself or one wrapped as `{"user": {...}}`.
fn user_from_status(body: Value) -> Option<User> {
    if body.get("authenticated").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    let nested = body.get("user").filter(|u| u.is_object()).cloned();
    let candidate = nested.unwrap_or(body);
    serde_json::from_value(candidate).ok()
}

impl AuthApi for HttpClient {
    fn sign_up(&self, request: &SignUp) -> Result<AuthReply> {
        let url = endpoint(&self.auth, &["signUp"])?;
        read_json(self.post(url).json(request).send()?, "Sign up failed").map_err(|e| match e {
            ApiError::Status {
                status,
                message,
                body,
            } => ApiError::Status {
                status,
                message: friendly_sign_up_message(&message),
                body,
            },
            other => other,
        })
    }

    fn confirm_sign_up(&self, username: &str, code: &str) -> Result<AuthReply> {
        let url = endpoint(&self.auth, &["confirmSignUp"])?;
        let body = ConfirmSignUp {
            username,
            confirmationcode: code,
        };
        read_json(self.post(url).json(&body).send()?, "Confirmation failed")
    }

    fn login(&self, username: &str, password: &str) -> Result<AuthReply> {
        let url = endpoint(&self.auth, &["login"])?;
        let reply = read_json(
            self.post(url)
                .json(&Credentials { username, password })
                .send()?,
            "Login failed",
        )?;
        tracing::info!("Logged in as {}", username);
        Ok(reply)
    }

    fn check_status(&self) -> Result<Option<User>> {
        let url = endpoint(&self.auth, &["check-status"])?;
        let response = self.get(url).send()?;
        if !response.status().is_success() {
            tracing::debug!("Session check returned {}", response.status());
            return Ok(None);
        }
        let body: Value = serde_json::from_str(&response.text()?)?;
        Ok(user_from_status(body))
    }

    fn logout(&self) -> Result<()> {
        let url = endpoint(&self.auth, &["logout"])?;
        check(self.post(url).send()?, "Logout failed")?;
        Ok(())
    }

    fn forgot_password(&self, username: &str) -> Result<AuthReply> {
        let url = endpoint(&self.auth, &["forgot-password"])?;
        read_json(
            self.post(url).json(&ForgotPassword { username }).send()?,
            "Failed to send password reset code",
        )
    }

    fn confirm_forgot_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<AuthReply> {
        let url = endpoint(&self.auth, &["confirm-forgot-password"])?;
        let body = ConfirmForgotPassword {
            username,
            confirmation_code: code,
            new_password,
        };
        read_json(
            self.post(url).json(&body).send()?,
            "Failed to reset password",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_provider_messages_are_rewritten() {
        assert!(friendly_sign_up_message("Password did not conform with policy: too short")
            .starts_with("Password must contain"));
        assert_eq!(
            friendly_sign_up_message("An account with the given email already exists."),
            "An account with this email already exists. Try signing in instead."
        );
        assert_eq!(friendly_sign_up_message("Something else"), "Something else");
    }

    #[test]
    fn status_body_shapes() {
        let flat = user_from_status(json!({ "username": "ana" })).unwrap();
        assert_eq!(flat.username, "ana");

        let wrapped = user_from_status(json!({ "authenticated": true, "user": { "username": "bo" } }))
            .unwrap();
        assert_eq!(wrapped.username, "bo");

        assert!(user_from_status(json!({ "authenticated": false })).is_none());
        assert!(user_from_status(json!({ "message": "no session" })).is_none());
    }

    #[test]
    fn reset_payload_uses_camel_case() {
        let body = serde_json::to_value(ConfirmForgotPassword {
            username: "ana",
            confirmation_code: "123456",
            new_password: "secret123",
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "username": "ana", "confirmationCode": "123456", "newPassword": "secret123" })
        );
    }
}
