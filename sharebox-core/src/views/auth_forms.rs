//! Login and register forms

use tracing::warn;

use super::Feedback;
use crate::api::{ApiClient, ApiError};
use crate::session::Session;
use crate::validators::{
    validate_email, validate_name, validate_password, INVALID_EMAIL, INVALID_NAME,
    INVALID_PASSWORD,
};

pub const LOGIN_SUCCESS: &str = "Logged in successfully. Redirecting....";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const REGISTER_SUCCESS: &str = "Registered successfully. Please sign in.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const NETWORK_FAILED: &str = "Could not complete action. Please try again later.";

/// Server message if it sent one, otherwise the generic failure
fn failure_message(err: &ApiError, generic: &str) -> String {
    if err.is_transport() {
        return NETWORK_FAILED.to_string();
    }
    err.server_message().unwrap_or(generic).to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub show_password: bool,
    pub focus: LoginField,
    pub feedback: Feedback,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn focused(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// Type into the focused field. Editing clears the error.
    pub fn push_char(&mut self, c: char) {
        self.focused().push(c);
        self.feedback.clear();
    }

    pub fn pop_char(&mut self) {
        self.focused().pop();
        self.feedback.clear();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Validate locally. Returns the credentials to send, or `None` with
    /// the validation message shown.
    pub fn begin_submit(&mut self) -> Option<(String, String)> {
        self.feedback.clear();

        if !validate_email(&self.email) {
            self.feedback.fail(INVALID_EMAIL);
            return None;
        }

        if !validate_password(&self.password) {
            self.feedback.fail(INVALID_PASSWORD);
            return None;
        }

        self.feedback.start();
        Some((self.email.clone(), self.password.clone()))
    }

    /// Adopt the issued token. Returns true when the session is now live.
    pub fn apply_submit(&mut self, session: &Session, result: Result<String, ApiError>) -> bool {
        match result {
            Ok(token) => match session.login(&token) {
                Ok(_) => {
                    self.password.clear();
                    self.feedback.succeed(LOGIN_SUCCESS);
                    true
                }
                Err(e) => {
                    warn!("Login returned an unusable token: {}", e);
                    self.feedback.fail(LOGIN_FAILED);
                    false
                }
            },
            Err(e) => {
                warn!("Login failed: {}", e);
                self.feedback.fail(failure_message(&e, LOGIN_FAILED));
                false
            }
        }
    }

    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        let Some((email, password)) = self.begin_submit() else {
            return false;
        };
        let result = api.login(&email, &password).await;
        self.apply_submit(api.session(), result)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegisterField {
    #[default]
    Name,
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub show_password: bool,
    pub focus: RegisterField,
    pub feedback: Feedback,
}

/// Fields of a validated registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn focused(&mut self) -> &mut String {
        match self.focus {
            RegisterField::Name => &mut self.name,
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused().push(c);
        self.feedback.clear();
    }

    pub fn pop_char(&mut self) {
        self.focused().pop();
        self.feedback.clear();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            RegisterField::Name => RegisterField::Email,
            RegisterField::Email => RegisterField::Password,
            RegisterField::Password => RegisterField::Name,
        };
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn begin_submit(&mut self) -> Option<Registration> {
        self.feedback.clear();

        if !validate_name(&self.name) {
            self.feedback.fail(INVALID_NAME);
            return None;
        }

        if !validate_email(&self.email) {
            self.feedback.fail(INVALID_EMAIL);
            return None;
        }

        if !validate_password(&self.password) {
            self.feedback.fail(INVALID_PASSWORD);
            return None;
        }

        self.feedback.start();
        Some(Registration {
            name: self.name.trim().to_string(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }

    /// Returns true when the account was created
    pub fn apply_submit(&mut self, result: Result<(), ApiError>) -> bool {
        match result {
            Ok(()) => {
                self.password.clear();
                self.feedback.succeed(REGISTER_SUCCESS);
                true
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                self.feedback.fail(failure_message(&e, REGISTER_FAILED));
                false
            }
        }
    }

    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        let Some(reg) = self.begin_submit() else {
            return false;
        };
        let result = api.register(&reg.name, &reg.email, &reg.password).await;
        self.apply_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_login_validation_order() {
        let mut form = login_form("bad", "weak");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.feedback.error(), Some(INVALID_EMAIL));

        let mut form = login_form("user@test.com", "weak");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.feedback.error(), Some(INVALID_PASSWORD));

        let mut form = login_form("user@test.com", "Passw0rd!");
        assert_eq!(
            form.begin_submit(),
            Some(("user@test.com".to_string(), "Passw0rd!".to_string()))
        );
        assert!(form.feedback.loading);
    }

    #[test]
    fn test_editing_clears_error() {
        let mut form = login_form("bad", "");
        form.begin_submit();
        assert!(form.feedback.error().is_some());

        form.push_char('x');
        assert_eq!(form.email, "badx");
        assert!(form.feedback.error().is_none());

        form.next_field();
        form.push_char('p');
        form.pop_char();
        form.push_char('q');
        assert_eq!(form.password, "q");
    }

    #[test]
    fn test_login_server_message() {
        let session = Session::init(Arc::new(MemoryTokenStore::new()));
        let mut form = login_form("user@test.com", "Passw0rd!");
        form.begin_submit();

        let ok = form.apply_submit(
            &session,
            Err(ApiError::Rejected {
                status: 400,
                message: Some("Invalid credentials".to_string()),
            }),
        );
        assert!(!ok);
        assert_eq!(form.feedback.error(), Some("Invalid credentials"));

        form.apply_submit(&session, Err(ApiError::Rejected { status: 500, message: None }));
        assert_eq!(form.feedback.error(), Some(LOGIN_FAILED));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_with_unusable_token() {
        let session = Session::init(Arc::new(MemoryTokenStore::new()));
        let mut form = login_form("user@test.com", "Passw0rd!");

        assert!(!form.apply_submit(&session, Ok("garbage".to_string())));
        assert_eq!(form.feedback.error(), Some(LOGIN_FAILED));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_register_validation() {
        let mut form = RegisterForm {
            name: "A".to_string(),
            email: "user@test.com".to_string(),
            password: "Passw0rd!".to_string(),
            ..Default::default()
        };
        assert!(form.begin_submit().is_none());
        assert_eq!(form.feedback.error(), Some(INVALID_NAME));

        form.name = "  Ada Lovelace ".to_string();
        form.email = "nope".to_string();
        assert!(form.begin_submit().is_none());
        assert_eq!(form.feedback.error(), Some(INVALID_EMAIL));

        form.email = "ada@test.com".to_string();
        let reg = form.begin_submit().unwrap();
        assert_eq!(reg.name, "Ada Lovelace");

        assert!(form.apply_submit(Ok(())));
        assert_eq!(form.feedback.message(), Some(REGISTER_SUCCESS));
        assert!(form.password.is_empty());
    }

    #[test]
    fn test_register_focus_cycle() {
        let mut form = RegisterForm::new();
        assert_eq!(form.focus, RegisterField::Name);
        form.next_field();
        form.next_field();
        assert_eq!(form.focus, RegisterField::Password);
        form.next_field();
        assert_eq!(form.focus, RegisterField::Name);
    }
}
