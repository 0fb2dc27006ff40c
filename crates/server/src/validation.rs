//! Field-level checks applied to request bodies before they reach the
//! auth service.

use std::collections::BTreeMap;

use service::auth::domain::{LoginInput, RegisterInput};

use crate::errors::ApiError;

const MIN_USERNAME_LEN: usize = 5;
const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, msg: String) {
        self.0.entry(field.to_string()).or_insert(msg);
    }

    fn required(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() {
            self.add(field, format!("{field} is a required field"));
            return false;
        }
        true
    }

    fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("{field} must be at least {min} characters in length"));
        }
    }

    fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.add(field, format!("{field} must be a valid email address"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::field_errors(self.0))
        }
    }
}

/// One `@`, a non-empty local part and a dotted domain without blanks.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

pub fn validate_login(input: &LoginInput) -> Result<(), ApiError> {
    let mut errs = FieldErrors::default();
    if errs.required("email", &input.email) {
        errs.email("email", &input.email);
    }
    errs.required("password", &input.password);
    errs.into_result()
}

pub fn validate_register(input: &RegisterInput) -> Result<(), ApiError> {
    let mut errs = FieldErrors::default();
    if errs.required("username", &input.username) {
        errs.min_len("username", &input.username, MIN_USERNAME_LEN);
    }
    if errs.required("email", &input.email) {
        errs.email("email", &input.email);
    }
    if errs.required("password", &input.password) {
        errs.min_len("password", &input.password, MIN_PASSWORD_LEN);
    }
    if errs.required("repeatPassword", &input.repeat_password) {
        errs.min_len("repeatPassword", &input.repeat_password, MIN_PASSWORD_LEN);
    }
    errs.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_email("john@provider.net"));
        assert!(is_email("a.b+c@mail.example.com"));
        assert!(!is_email("john"));
        assert!(!is_email("@provider.net"));
        assert!(!is_email("john@provider"));
        assert!(!is_email("john@@provider.net"));
        assert!(!is_email("jo hn@provider.net"));
        assert!(!is_email("john@provider..net"));
    }

    #[test]
    fn login_requires_fields() {
        let err = validate_login(&LoginInput { email: String::new(), password: String::new() }).unwrap_err();
        let more = err.body.more.unwrap();
        assert_eq!(more["email"], "email is a required field");
        assert_eq!(more["password"], "password is a required field");

        assert!(validate_login(&LoginInput { email: "jack@gmail.com".into(), password: "x".into() }).is_ok());
    }

    #[test]
    fn register_enforces_lengths() {
        let input = RegisterInput {
            username: "abc".into(),
            email: "bad".into(),
            password: "1234".into(),
            repeat_password: "1234567".into(),
        };
        let more = validate_register(&input).unwrap_err().body.more.unwrap();
        assert_eq!(more["username"], "username must be at least 5 characters in length");
        assert_eq!(more["email"], "email must be a valid email address");
        assert_eq!(more["password"], "password must be at least 5 characters in length");
        assert!(more.get("repeatPassword").is_none());
    }

    #[test]
    fn valid_register_passes() {
        let input = RegisterInput {
            username: "gholi".into(),
            email: "gholi@gmail.com".into(),
            password: "1234567".into(),
            repeat_password: "1234567".into(),
        };
        assert!(validate_register(&input).is_ok());
    }
}
