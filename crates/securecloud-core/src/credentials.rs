//! Login credentials type.

use std::fmt;

use crate::error::InvalidInputError;

/// Email and password used to open a session.
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use securecloud_core::Credentials;
///
/// let creds = Credentials::new("analyst@example.com", "hunter2").unwrap();
/// assert_eq!(creds.email(), "analyst@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if either field is empty after trimming.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, InvalidInputError> {
        let email = email.into().trim().to_string();
        let password = password.into();

        if email.is_empty() {
            return Err(InvalidInputError::Empty { field: "email" });
        }
        if password.is_empty() {
            return Err(InvalidInputError::Empty { field: "password" });
        }

        Ok(Self { email, password })
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// Use this only when constructing the login request.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
