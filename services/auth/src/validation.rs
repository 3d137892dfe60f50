//! Input validation for account registration

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_EMAIL_LEN: usize = 120;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(format!("Username must be at most {MAX_USERNAME_LEN} characters long"));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email must be at most {MAX_EMAIL_LEN} characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();
    if length < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if length > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("road_watch_42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(64)).is_ok());
        assert!(validate_username(&"a".repeat(65)).is_err());
        assert_eq!(
            validate_username("no spaces"),
            Err("Username can only contain letters, numbers, and underscores".to_string())
        );
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("ward7@civictrack.org").is_ok());
        assert_eq!(validate_email(""), Err("Email is required".to_string()));
        assert_eq!(validate_email("not-an-email"), Err("Invalid email format".to_string()));

        let long = format!("{}@example.org", "a".repeat(110));
        assert!(long.len() > MAX_EMAIL_LEN);
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Str0ng!Pass").is_ok());
        assert!(validate_password("Sh0rt!").is_err());
        assert_eq!(
            validate_password("alllower1!"),
            Err("Password must contain at least one uppercase letter".to_string())
        );
        assert_eq!(
            validate_password("NoDigits!!"),
            Err("Password must contain at least one digit".to_string())
        );
        assert_eq!(
            validate_password("NoSpecial123"),
            Err("Password must contain at least one special character".to_string())
        );
    }
}
