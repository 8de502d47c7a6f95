use clap::Subcommand;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user account
    Create {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email address, used to log in
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Mark the account as staff
        #[arg(long)]
        staff: bool,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Remove a user account
    ///
    /// Tokens, tags and ethnic groups are deleted with the account; other
    /// records are kept without an owner.
    Remove {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email address of the account
        #[arg(long)]
        email: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}
