use crate::auth::PasswordHasher;
use crate::controllers::provision_user;
use crate::store::{FileStore, Store, UserStore};
use crate::types::User;

use super::{confirm_action, init_store, resolve_credentials};

pub fn run_user_add(
    data_dir: String,
    email: Option<String>,
    password: Option<String>,
    admin: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let creds = resolve_credentials(email, password, non_interactive)?;

    let user = provision_user(
        &store,
        &PasswordHasher::new(),
        &creds.email,
        &creds.password,
        admin,
    )?;

    println!();
    println!("Created user \"{}\" ({})", user.email, user.id);
    if creds.generated {
        println!("Password: {}", creds.password);
        println!("  Save this now - it cannot be retrieved later.");
    }
    println!();

    Ok(())
}

fn json_rows(store: &dyn Store, users: &[User]) -> anyhow::Result<Vec<serde_json::Value>> {
    users
        .iter()
        .map(|u| -> anyhow::Result<serde_json::Value> {
            let root_id = store.user_root_file(&u.id)?.map(|f| f.id);
            Ok(serde_json::json!({
                "id": u.id,
                "email": u.email,
                "is_admin": u.is_admin,
                "root_id": root_id,
                "created_at": u.created_at,
            }))
        })
        .collect()
}

pub fn run_user_list(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let users = store.all_users()?;

    if json {
        let rows = json_rows(&store, &users)?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    for user in users {
        let role = if user.is_admin { "admin" } else { "user" };
        println!("{}  {}  ({role})", user.id, user.email);
    }

    Ok(())
}

pub fn run_user_remove(
    data_dir: String,
    user_id: String,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let Some(user) = store.get_user(&user_id)? else {
        anyhow::bail!("User '{}' not found", user_id);
    };

    let confirmed = confirm_action(
        &format!(
            "Delete user '{}'? This will also delete their files, permissions and sessions.",
            user.email
        ),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete_user(&user.id)?;

    println!();
    println!("Deleted user '{}'", user.email);
    println!();

    Ok(())
}
