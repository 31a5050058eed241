//! Credential validators for the login and register forms
//!
//! All checks are pure and total: bad input yields `false`, never an error.

pub const INVALID_EMAIL: &str = "Invalid email";
pub const INVALID_NAME: &str = "Invalid name";
pub const INVALID_PASSWORD: &str = "Password must be at least 8 characters long and include 1 uppercase, 1 lowercase, 1 number, and 1 special character";

/// Minimum password length in characters
const MIN_PASSWORD_LEN: usize = 8;

/// Minimum length of each word in a display name
const MIN_NAME_WORD_LEN: usize = 2;

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with at least one character on each side.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(is_js_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// The `\s` class of ECMAScript regexes: Unicode `White_Space` without
/// NEL, plus the byte order mark.
fn is_js_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

/// One or more alphabetic words separated by single spaces, each at least
/// two letters long. Surrounding whitespace is ignored.
pub fn validate_name(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }

    name.split(' ').all(|word| {
        word.len() >= MIN_NAME_WORD_LEN && word.chars().all(|c| c.is_ascii_alphabetic())
    })
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("user@test.com"));
        assert!(validate_email("a.b+tag@sub.example.org"));
        assert!(validate_email("x@y.z"));
        assert!(validate_email("x@y..z"));
        assert!(validate_email("a\u{85}b@test.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!validate_email(""));
        assert!(!validate_email("user"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("@test.com"));
        assert!(!validate_email("user@test"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email("user@test."));
        assert!(!validate_email("us er@test.com"));
        assert!(!validate_email("user@@test.com"));
        assert!(!validate_email("user@te@st.com"));
        assert!(!validate_email(" user@test.com"));
        assert!(!validate_email("a\u{FEFF}b@test.com"));
        assert!(!validate_email("user@test.co\u{3000}m"));
        assert!(!validate_email("user\u{2028}@test.com"));
    }

    #[test]
    fn test_names() {
        assert!(validate_name("Ada"));
        assert!(validate_name("Ada Lovelace"));
        assert!(validate_name("  Grace Brewster Hopper  "));

        assert!(!validate_name(""));
        assert!(!validate_name("   "));
        assert!(!validate_name("A"));
        assert!(!validate_name("Ada  Lovelace"));
        assert!(!validate_name("Ada L"));
        assert!(!validate_name("Ada3"));
        assert!(!validate_name("Jean-Luc"));
    }

    #[test]
    fn test_passwords() {
        assert!(validate_password("Passw0rd!"));
        assert!(validate_password("aB3$aB3$"));

        assert!(!validate_password("Pa0!"));
        assert!(!validate_password("password0!"));
        assert!(!validate_password("PASSWORD0!"));
        assert!(!validate_password("Password!!"));
        assert!(!validate_password("Password00"));
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Seven characters, one of them multi-byte
        assert!(!validate_password("Aa1!ééé"));
        assert!(validate_password("Aa1!éééé"));
    }
}
