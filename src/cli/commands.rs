use clap::Subcommand;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the server (create database and first admin user)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email of the admin user
        #[arg(long)]
        email: Option<String>,

        /// Password of the admin user (generated if omitted)
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts (requires --email)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user with its root folder
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email of the new user
        #[arg(long)]
        email: Option<String>,

        /// Password of the new user (generated if omitted in non-interactive mode)
        #[arg(long)]
        password: Option<String>,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,

        /// Skip interactive prompts (requires --email)
        #[arg(long)]
        non_interactive: bool,
    },

    /// List users
    List {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a user and everything they own
    Remove {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User ID to remove
        #[arg(long)]
        user_id: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
