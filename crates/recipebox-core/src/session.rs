//! Sign-in state.

use crate::api::AuthApi;
use crate::error::{ApiError, Result};
use crate::models::{AuthReply, SignUp, User};

/// Who is signed in, plus the last auth failure.
#[derive(Debug, Default)]
pub struct SessionStore {
    user: Option<User>,
    error: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Owner id used by the album and recipe services.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("Auth request failed: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Ask the service who is signed in. Failures mean signed out.
    pub fn probe<A: AuthApi + ?Sized>(&mut self, api: &A) -> Option<&User> {
        self.user = match api.check_status() {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!("Session check failed: {}", e);
                None
            }
        };
        self.user.as_ref()
    }

    pub fn login<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        username: &str,
        password: &str,
    ) -> Result<&User> {
        let reply = api.login(username, password);
        self.record(reply)?;

        if self.probe(api).is_none() {
            let message = "Signed in, but the session could not be verified";
            tracing::warn!("{}", message);
            self.error = Some(message.to_string());
            return Err(ApiError::Rejected(message.into()));
        }
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::Rejected("Not signed in".into()))
    }

    /// Forget the user even when the server call fails.
    pub fn logout<A: AuthApi + ?Sized>(&mut self, api: &A) {
        if let Err(e) = api.logout() {
            tracing::warn!("Logout request failed: {}", e);
        }
        self.user = None;
        self.error = None;
        tracing::info!("Signed out");
    }

    pub fn sign_up<A: AuthApi + ?Sized>(&mut self, api: &A, request: &SignUp) -> Result<AuthReply> {
        let reply = api.sign_up(request);
        self.record(reply)
    }

    pub fn confirm_sign_up<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        username: &str,
        code: &str,
    ) -> Result<AuthReply> {
        let reply = api.confirm_sign_up(username, code);
        self.record(reply)
    }

    pub fn forgot_password<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        username: &str,
    ) -> Result<AuthReply> {
        let reply = api.forgot_password(username);
        self.record(reply)
    }

    pub fn confirm_forgot_password<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<AuthReply> {
        let reply = api.confirm_forgot_password(username, code, new_password);
        self.record(reply)
    }
}
