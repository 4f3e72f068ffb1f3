//! Stencil CLI — turn recorded conversations into reusable, parameterized
//! templates.
//!
//! Drafts live in JSON/YAML files and are edited one command at a time;
//! submitted templates and the share directory live in SQLite.

use clap::{Parser, Subcommand};

use stencil_cli::commands;
use stencil_cli::commands::draft::MetaUpdate;
use stencil_core::models::{ShareGrant, StepId, VariablePatch, Visibility};

/// Stencil — conversation-to-template builder
#[derive(Parser)]
#[command(name = "stencil", version, about = "Stencil — turn recorded conversations into reusable templates")]
pub struct Cli {
    /// Path to the SQLite database file (default: ~/.stencil/stencil.db)
    #[arg(long, env = "STENCIL_DB_PATH")]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and edit template drafts
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Manage submitted templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Users and roles templates can be shared with
    Directory {
        #[command(subcommand)]
        action: DirectoryAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Import a transcript (JSON or YAML) into a new draft
    Init {
        /// Transcript file: a list of {role, content, toolName} turns
        transcript: String,
        /// Draft file to write (.json, .yaml or .yml)
        #[arg(long, short = 'o')]
        output: String,
        /// Template name
        #[arg(long)]
        name: Option<String>,
        /// Template description
        #[arg(long)]
        description: Option<String>,
    },
    /// Print a draft as JSON
    Show {
        draft: String,
    },
    /// Replace the text of a user step
    Edit {
        draft: String,
        /// Step id (as shown by `draft show`)
        #[arg(long)]
        step: StepId,
        /// New step text; `{name}` marks a variable
        #[arg(long)]
        content: String,
    },
    /// Rename a variable everywhere it is used
    Rename {
        draft: String,
        old_name: String,
        new_name: String,
    },
    /// Delete a variable and strip it from every step
    DeleteVar {
        draft: String,
        name: String,
    },
    /// Update a variable's metadata
    SetVar {
        draft: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        required: Option<bool>,
        /// Default value used when none is supplied
        #[arg(long, conflicts_with = "clear_default")]
        default: Option<String>,
        /// Remove the default value
        #[arg(long)]
        clear_default: bool,
    },
    /// Set name, description, visibility and sharing.
    /// Grants only persist for the matching visibility (users / roles).
    Meta {
        draft: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// private | users | roles | public
        #[arg(long)]
        visibility: Option<Visibility>,
        /// Share with a user: ID or ID:read / ID:write (repeatable)
        #[arg(long, value_parser = commands::parse_grant)]
        share_user: Vec<ShareGrant>,
        /// Share with a role: ID or ID:read / ID:write (repeatable)
        #[arg(long, value_parser = commands::parse_grant)]
        share_role: Vec<ShareGrant>,
        /// Remove a user grant (repeatable)
        #[arg(long)]
        unshare_user: Vec<String>,
        /// Remove a role grant (repeatable)
        #[arg(long)]
        unshare_role: Vec<String>,
    },
    /// Check a draft against the submission rules
    Validate {
        draft: String,
    },
    /// Validate and store a draft as a template
    Submit {
        draft: String,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List stored templates
    List,
    /// Show a stored template as JSON
    Show {
        id: String,
    },
    /// Delete a stored template
    Delete {
        id: String,
    },
    /// Fill in a template's variables and print each user step
    Render {
        id: String,
        /// Variable value as KEY=VALUE (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DirectoryAction {
    /// Search users by email
    Users {
        #[arg(long, default_value = "")]
        query: String,
    },
    /// List roles
    Roles,
    /// Add or update a user
    AddUser {
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: String,
    },
    /// Add or update a role
    AddRole {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stencil_core=warn,stencil_cli=info".into()),
        )
        .init();

    let db_path = cli.db.unwrap_or_else(commands::default_db_path);

    let result = match cli.command {
        Commands::Draft { action } => match action {
            DraftAction::Init {
                transcript,
                output,
                name,
                description,
            } => commands::draft::init(&transcript, &output, name.as_deref(), description.as_deref()),
            DraftAction::Show { draft } => commands::draft::show(&draft),
            DraftAction::Edit {
                draft,
                step,
                content,
            } => commands::draft::edit(&draft, step, &content),
            DraftAction::Rename {
                draft,
                old_name,
                new_name,
            } => commands::draft::rename(&draft, &old_name, &new_name),
            DraftAction::DeleteVar { draft, name } => commands::draft::delete_var(&draft, &name),
            DraftAction::SetVar {
                draft,
                name,
                description,
                required,
                default,
                clear_default,
            } => {
                let default_value = if clear_default { Some(None) } else { default.map(Some) };
                let patch = VariablePatch {
                    description,
                    required,
                    default_value,
                };
                commands::draft::set_var(&draft, &name, patch)
            }
            DraftAction::Meta {
                draft,
                name,
                description,
                visibility,
                share_user,
                share_role,
                unshare_user,
                unshare_role,
            } => commands::draft::meta(
                &draft,
                MetaUpdate {
                    name,
                    description,
                    visibility,
                    share_users: share_user,
                    share_roles: share_role,
                    unshare_users: unshare_user,
                    unshare_roles: unshare_role,
                },
            ),
            DraftAction::Validate { draft } => commands::draft::validate(&draft),
            DraftAction::Submit { draft } => match commands::init_state(&db_path) {
                Ok(state) => commands::draft::submit(&state, &draft).await,
                Err(e) => Err(e),
            },
        },

        Commands::Template { action } => match commands::init_state(&db_path) {
            Ok(state) => match action {
                TemplateAction::List => commands::template::list(&state).await,
                TemplateAction::Show { id } => commands::template::show(&state, &id).await,
                TemplateAction::Delete { id } => commands::template::delete(&state, &id).await,
                TemplateAction::Render { id, vars } => {
                    commands::template::render(&state, &id, &vars).await
                }
            },
            Err(e) => Err(e),
        },

        Commands::Directory { action } => match commands::init_state(&db_path) {
            Ok(state) => match action {
                DirectoryAction::Users { query } => commands::directory::users(&state, &query).await,
                DirectoryAction::Roles => commands::directory::roles(&state).await,
                DirectoryAction::AddUser { id, email } => {
                    commands::directory::add_user(&state, &id, &email).await
                }
                DirectoryAction::AddRole { id, name } => {
                    commands::directory::add_role(&state, &id, &name).await
                }
            },
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
