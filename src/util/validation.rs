use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
        .expect("compile email regex")
});

const EMAIL_MAX: usize = 254;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;
const FULL_NAME_MAX: usize = 100;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && email.len() <= EMAIL_MAX
}

pub fn is_valid_password(pass: &str) -> bool {
    (PASSWORD_MIN..=PASSWORD_MAX).contains(&pass.len())
}

pub fn is_valid_full_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.len() <= FULL_NAME_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("gush@gmail.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("nada_neutho"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_is_valid_password() {
        assert!(is_valid_password("12345678"));
        assert!(!is_valid_password("1234567"));
        assert!(!is_valid_password(&"x".repeat(129)));
    }

    #[test]
    fn test_is_valid_full_name() {
        assert!(is_valid_full_name("Ada Lovelace"));
        assert!(!is_valid_full_name("   "));
        assert!(!is_valid_full_name(&"a".repeat(101)));
    }
}
