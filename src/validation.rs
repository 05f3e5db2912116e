use crate::error::{Error, Result};

const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 256;
const MAX_FILE_NAME_LEN: usize = 255;

/// Trims and lowercases an email so lookups and the unique index agree.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks the shape of an already normalized email: one `@`, a non-empty
/// local part and a dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::Validation("email cannot be empty".into()));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(Error::Validation(format!(
            "email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::Validation("email cannot contain whitespace".into()));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(Error::Validation("email must contain '@'".into()));
    };

    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());

    if local.is_empty() || !domain_ok {
        return Err(Error::Validation(format!("'{email}' is not a valid email")));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "password cannot exceed {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("file name cannot be empty".into()));
    }
    if name.len() > MAX_FILE_NAME_LEN {
        return Err(Error::Validation(format!(
            "file name cannot exceed {MAX_FILE_NAME_LEN} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::Validation(format!("'{name}' is a reserved name")));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(Error::Validation(
            "file name cannot contain '/', '\\' or NUL".into(),
        ));
    }
    Ok(())
}
