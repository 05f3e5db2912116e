mod commands;
mod init;
mod user;

pub use commands::{AdminCommands, UserCommands};
pub use init::run_init;
pub use user::{run_user_add, run_user_list, run_user_remove};

use crate::auth::generate_password;
use crate::config::DB_FILE_NAME;
use crate::store::SqliteStore;
use crate::validation::{validate_email, validate_password};

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let data_path: std::path::PathBuf = data_dir.into();
    let db_path = data_path.join(DB_FILE_NAME);

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'filesync admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}

pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}

/// Credentials for a user about to be provisioned from the command line.
pub struct NewCredentials {
    pub email: String,
    pub password: String,
    /// True when the password was generated and must be shown to the operator.
    pub generated: bool,
}

/// Fills in missing email/password from prompts, or generates a password
/// in non-interactive mode.
pub fn resolve_credentials(
    email: Option<String>,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<NewCredentials> {
    let email = match email {
        Some(email) => email,
        None if non_interactive => anyhow::bail!("--email is required in non-interactive mode"),
        None => inquire::Text::new("Email:")
            .with_validator(|input: &str| {
                let normalized = crate::validation::normalize_email(input);
                Ok(validate_email(&normalized)
                    .map(|()| inquire::validator::Validation::Valid)
                    .unwrap_or_else(|e| {
                        inquire::validator::Validation::Invalid(e.to_string().into())
                    }))
            })
            .prompt()?,
    };

    let (password, generated) = match password {
        Some(password) => (password, false),
        None if non_interactive => (generate_password(), true),
        None => {
            let password = inquire::Password::new("Password:")
                .with_validator(|input: &str| {
                    Ok(validate_password(input)
                        .map(|()| inquire::validator::Validation::Valid)
                        .unwrap_or_else(|e| {
                            inquire::validator::Validation::Invalid(e.to_string().into())
                        }))
                })
                .prompt()?;
            (password, false)
        }
    };

    Ok(NewCredentials {
        email,
        password,
        generated,
    })
}
