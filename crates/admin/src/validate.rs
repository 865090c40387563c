use super::*;

pub fn username(value: &str) -> Result<(), AdminError> {
    let length = value.chars().count();
    let charset = value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    match (uam_core::USERNAME_MIN..=uam_core::USERNAME_MAX).contains(&length) && charset {
        true => Ok(()),
        false => Err(AdminError::invalid(
            "Invalid username. Must be 3-50 characters, alphanumeric and underscore only.",
        )),
    }
}

pub fn email(value: &str) -> Result<(), AdminError> {
    match value.contains('@') && value.contains('.') {
        true => Ok(()),
        false => Err(AdminError::invalid("Invalid email format.")),
    }
}

pub fn full_name(value: &str) -> Result<(), AdminError> {
    match value.trim().chars().count() >= uam_core::FULL_NAME_MIN {
        true => Ok(()),
        false => Err(AdminError::invalid("Full name must be at least 2 characters.")),
    }
}

pub fn password(value: &str) -> Result<(), AdminError> {
    match value.is_empty() {
        true => Err(AdminError::invalid("Password is required.")),
        false => Ok(()),
    }
}

pub fn required<'a>(label: &str, value: &'a str) -> Result<&'a str, AdminError> {
    match value.trim() {
        "" => Err(AdminError::invalid(format!("{} is required.", label))),
        trimmed => Ok(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(username("alice").is_ok());
        assert!(username("a_1").is_ok());
        assert!(username("al").is_err());
        assert!(username("alice smith").is_err());
        assert!(username("alice-smith").is_err());
        assert!(username(&"a".repeat(50)).is_ok());
        assert!(username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn emails_and_names() {
        assert!(email("alice@x.com").is_ok());
        assert!(email("alice.x.com").is_err());
        assert!(email("alice@x").is_err());
        assert!(full_name("Al").is_ok());
        assert!(full_name(" A ").is_err());
        assert!(password("").is_err());
        assert_eq!(required("Role code", "  pin "), Ok("pin"));
        assert!(required("Role code", "  ").is_err());
    }
}
