use std::fs;
use std::path::PathBuf;

use crate::auth::PasswordHasher;
use crate::config::DB_FILE_NAME;
use crate::controllers::provision_user;
use crate::store::{SqliteStore, Store, UserStore};

use super::resolve_credentials;

pub fn run_init(
    data_dir: String,
    email: Option<String>,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join(DB_FILE_NAME);
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    if store.has_admin_user()? {
        anyhow::bail!(
            "Server already initialized. An admin user exists in {}",
            db_path.display()
        );
    }

    let creds = resolve_credentials(email, password, non_interactive)?;
    let user = provision_user(
        &store,
        &PasswordHasher::new(),
        &creds.email,
        &creds.password,
        true,
    )?;

    tracing::info!(user_id = %user.id, "Initialized database at {}", db_path.display());

    println!();
    println!("========================================");
    println!("Admin user created: {}", user.email);
    println!("  id: {}", user.id);
    if creds.generated {
        println!();
        println!("Generated password (save this, it won't be shown again):");
        println!();
        println!("  {}", creds.password);
    }
    println!("========================================");
    println!();

    Ok(())
}
