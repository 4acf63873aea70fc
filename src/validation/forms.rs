use crate::core::error::ValidationError;
use crate::models::article::CreateArticleRequest;
use crate::models::user::{LoginRequest, RegisterRequest, UpdateUserRequest};

/// Characters accepted as "special" by the password rule
const SPECIAL_CHARS: &str = "@#$%^&+=!*()_-{}[]:;\"'<>,.?/~`|";

const MIN_PASSWORD_LENGTH: usize = 8;
const MIN_LOGIN_PASSWORD_LENGTH: usize = 6;
const MIN_TITLE_LENGTH: usize = 3;
const MIN_CONTENT_LENGTH: usize = 10;

/// Result of checking a password against each strength rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub has_min_length: bool,
    pub has_number: bool,
    pub has_lower_case: bool,
    pub has_upper_case: bool,
    pub has_special_char: bool,
}

impl PasswordStrength {
    pub fn check(password: &str) -> Self {
        Self {
            has_min_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            has_number: password.chars().any(|c| c.is_ascii_digit()),
            has_lower_case: password.chars().any(|c| c.is_ascii_lowercase()),
            has_upper_case: password.chars().any(|c| c.is_ascii_uppercase()),
            has_special_char: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
        }
    }

    pub fn is_strong(&self) -> bool {
        self.missing().is_empty()
    }

    /// Human-readable list of the rules that failed
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_min_length {
            missing.push("at least 8 characters");
        }
        if !self.has_number {
            missing.push("a digit");
        }
        if !self.has_lower_case {
            missing.push("a lowercase letter");
        }
        if !self.has_upper_case {
            missing.push("an uppercase letter");
        }
        if !self.has_special_char {
            missing.push("a special character");
        }
        missing
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let strength = PasswordStrength::check(password);
    if strength.is_strong() {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword {
            missing: strength.missing(),
        })
    }
}

/// Loose `local@domain` check, whitespace not allowed
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(invalid());
    }

    Ok(())
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

fn min_length(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

/// Raw login form input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email_or_username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<LoginRequest, ValidationError> {
        let email_or_username = required("Email or username", &self.email_or_username)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        min_length("Password", &self.password, MIN_LOGIN_PASSWORD_LENGTH)?;

        Ok(LoginRequest {
            email_or_username,
            password: self.password,
        })
    }
}

/// Raw registration form input
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(self) -> Result<RegisterRequest, ValidationError> {
        let username = required("Username", &self.username)?;
        let email = required("Email", &self.email)?;
        validate_email(&email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        validate_password(&self.password)?;

        Ok(RegisterRequest {
            username,
            email,
            password: self.password,
        })
    }
}

/// Profile form; an empty password means "keep the current one"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl ProfileForm {
    /// Build the update request, sending only fields that differ from the
    /// current values
    pub fn validate(self, current_username: &str, current_email: &str) -> Result<UpdateUserRequest, ValidationError> {
        let username = required("Username", &self.username)?;
        let email = required("Email", &self.email)?;
        validate_email(&email)?;
        if !self.password.is_empty() {
            validate_password(&self.password)?;
        }

        let changes = UpdateUserRequest {
            username: (username != current_username).then_some(username),
            email: (email != current_email).then_some(email),
            password: (!self.password.is_empty()).then_some(self.password),
        };

        if changes.is_empty() {
            return Err(ValidationError::NoChanges);
        }
        Ok(changes)
    }
}

/// Create-article form; `topic_id` is `None` until a topic is picked
#[derive(Debug, Clone, Default)]
pub struct ArticleForm {
    pub topic_id: Option<u64>,
    pub title: String,
    pub content: String,
}

impl ArticleForm {
    pub fn validate(self) -> Result<CreateArticleRequest, ValidationError> {
        let topic_id = self.topic_id.ok_or(ValidationError::Required("Topic"))?;
        let title = required("Title", &self.title)?;
        min_length("Title", &title, MIN_TITLE_LENGTH)?;
        let content = required("Content", &self.content)?;
        min_length("Content", &content, MIN_CONTENT_LENGTH)?;

        Ok(CreateArticleRequest {
            title,
            content,
            topic_id,
        })
    }
}
