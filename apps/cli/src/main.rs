//! Allowance CLI - command-line client for the family allowance backend.

mod commands;
mod output;

use allowance_api::{AllowanceClient, ClientConfig, ListType, Session};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Allowance CLI - manage children, allowances and shopping lists.
#[derive(Parser)]
#[command(name = "allowance")]
#[command(about = "Command-line client for the family allowance backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append JSON logs to a file (defaults to ~/.allowance/logs/client.jsonl)
    #[arg(long, global = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// Config file (defaults to ~/.allowance/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend origin, e.g. http://localhost:5125
    #[arg(long, env = "ALLOWANCE_API_BASE", global = true)]
    api_base: Option<String>,

    /// Access token from a previous login
    #[arg(long, env = "ALLOWANCE_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Refresh token from a previous login
    #[arg(long, env = "ALLOWANCE_REFRESH_TOKEN", global = true, hide_env_values = true)]
    refresh_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a parent
    LoginParent {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Sign in as a child
    LoginChild {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Register a parent account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },

    /// Revoke the refresh token and sign out
    Logout,

    /// Show or update the signed-in profile
    Me {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Manage children (parent)
    Children {
        #[command(subcommand)]
        command: ChildCommands,
    },

    /// Manage shopping lists
    Lists {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Manage shopping list items (child)
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },
}

#[derive(Subcommand)]
enum ChildCommands {
    /// List children
    List,
    /// Show a child
    Show { id: String },
    /// Create a child account
    Create {
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Monthly allowance
        #[arg(long, default_value_t = 0.0)]
        allowance: f64,
    },
    /// Set a child's monthly allowance
    Allowance { id: String, amount: f64 },
    /// Deduct from a child's balance
    DeductBalance { id: String, amount: f64 },
    /// Deduct points from a child
    DeductPoints { id: String, points: i32 },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Create a shopping list
    Create {
        title: String,
        #[arg(long = "type", value_enum, default_value = "normal")]
        list_type: ListKind,
    },
    /// Lists still being edited
    Active,
    /// Lists awaiting approval
    Pending,
    /// Approved and rejected lists
    History,
    /// Rename a list
    Rename { id: String, title: String },
    /// Submit a list for approval
    Submit { id: String },
    /// Delete a list
    Delete { id: String },
    /// Approve a submitted list (parent)
    Approve { id: String },
    /// Reject a submitted list (parent)
    Reject { id: String },
    /// A child's active lists (parent)
    ChildActive { child_id: String },
    /// A child's pending lists (parent)
    ChildPending { child_id: String },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add an item to a list
    Add { list_id: String, name: String },
    /// Rename an item and optionally set its price
    Update {
        list_id: String,
        item_id: String,
        name: String,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete an item
    Delete { list_id: String, item_id: String },
    /// Mark an item bought
    Complete {
        list_id: String,
        item_id: String,
        price: f64,
    },
    /// Check a photo of the price tag against an item
    Verify {
        list_id: String,
        item_id: String,
        /// Image file to upload
        image: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListKind {
    Normal,
    Emergency,
}

impl From<ListKind> for ListType {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Normal => ListType::Normal,
            ListKind::Emergency => ListType::Emergency,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let config_path = cli.config.clone().or_else(ClientConfig::default_path);
    let mut config = ClientConfig::load(config_path.as_deref())?;
    if let Some(base) = &cli.api_base {
        config.api_base_url = base.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(cli: &Cli, config: &ClientConfig) {
    let log_path = match &cli.log_file {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => observability::default_log_path(),
        None => None,
    };
    // Logs go to the file when one is given, otherwise to stderr
    let stderr = if log_path.is_some() {
        observability::StderrFormat::Off
    } else {
        observability::StderrFormat::Compact
    };
    let logging = observability::init_with_config(observability::LogConfig {
        service_name: "allowance-cli".into(),
        default_level: config.log_level.clone(),
        log_path,
        stderr,
    });
    if let Err(e) = logging {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

fn build_client(cli: &Cli, config: &ClientConfig) -> anyhow::Result<AllowanceClient> {
    debug!(api_base = %config.api_base_url, "Using backend");

    let session = Arc::new(Session::with_tokens(
        cli.access_token.clone(),
        cli.refresh_token.clone(),
    ));
    Ok(AllowanceClient::new(config, session)?)
}

async fn run(cli: Cli, config: ClientConfig) -> anyhow::Result<()> {
    let client = build_client(&cli, &config)?;
    let format = &cli.format;

    match cli.command {
        Commands::LoginParent { email } => {
            commands::login(&client, commands::LoginAs::Parent, email, format).await
        }
        Commands::LoginChild { email } => {
            commands::login(&client, commands::LoginAs::Child, email, format).await
        }
        Commands::Register {
            email,
            first_name,
            last_name,
        } => commands::register(&client, email, first_name, last_name, format).await,
        Commands::Logout => commands::logout(&client, format).await,
        Commands::Me {
            first_name,
            last_name,
            email,
        } => commands::me(&client, first_name, last_name, email, format).await,
        Commands::Children { command } => match command {
            ChildCommands::List => commands::children_list(&client, format).await,
            ChildCommands::Show { id } => commands::children_show(&client, &id, format).await,
            ChildCommands::Create {
                email,
                first_name,
                last_name,
                allowance,
            } => {
                commands::children_create(&client, email, first_name, last_name, allowance, format)
                    .await
            }
            ChildCommands::Allowance { id, amount } => {
                commands::children_allowance(&client, &id, amount, format).await
            }
            ChildCommands::DeductBalance { id, amount } => {
                commands::children_deduct_balance(&client, &id, amount, format).await
            }
            ChildCommands::DeductPoints { id, points } => {
                commands::children_deduct_points(&client, &id, points, format).await
            }
        },
        Commands::Lists { command } => match command {
            ListCommands::Create { title, list_type } => {
                commands::lists_create(&client, &title, list_type.into(), format).await
            }
            ListCommands::Active => {
                commands::lists_mine(&client, allowance_api::ListBucket::Active, format).await
            }
            ListCommands::Pending => {
                commands::lists_mine(&client, allowance_api::ListBucket::Pending, format).await
            }
            ListCommands::History => {
                commands::lists_mine(&client, allowance_api::ListBucket::History, format).await
            }
            ListCommands::Rename { id, title } => {
                commands::lists_rename(&client, &id, &title, format).await
            }
            ListCommands::Submit { id } => commands::lists_submit(&client, &id, format).await,
            ListCommands::Delete { id } => commands::lists_delete(&client, &id, format).await,
            ListCommands::Approve { id } => commands::lists_approve(&client, &id, format).await,
            ListCommands::Reject { id } => commands::lists_reject(&client, &id, format).await,
            ListCommands::ChildActive { child_id } => {
                commands::lists_child_active(&client, &child_id, format).await
            }
            ListCommands::ChildPending { child_id } => {
                commands::lists_child_pending(&client, &child_id, format).await
            }
        },
        Commands::Items { command } => match command {
            ItemCommands::Add { list_id, name } => {
                commands::items_add(&client, &list_id, &name, format).await
            }
            ItemCommands::Update {
                list_id,
                item_id,
                name,
                price,
            } => commands::items_update(&client, &list_id, &item_id, &name, price, format).await,
            ItemCommands::Delete { list_id, item_id } => {
                commands::items_delete(&client, &list_id, &item_id, format).await
            }
            ItemCommands::Complete {
                list_id,
                item_id,
                price,
            } => commands::items_complete(&client, &list_id, &item_id, price, format).await,
            ItemCommands::Verify {
                list_id,
                item_id,
                image,
            } => commands::items_verify(&client, &list_id, &item_id, &image, format).await,
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e.to_string(), &format);
            std::process::exit(2);
        }
    };
    init_logging(&cli, &config);

    if let Err(e) = run(cli, config).await {
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_file_flag_forms() {
        let cli = Cli::try_parse_from(["allowance", "logout"]).unwrap();
        assert!(cli.log_file.is_none());

        let cli = Cli::try_parse_from(["allowance", "logout", "--log-file"]).unwrap();
        assert!(matches!(cli.log_file, Some(None)));

        let cli = Cli::try_parse_from(["allowance", "logout", "--log-file", "/tmp/a.jsonl"]).unwrap();
        assert_eq!(cli.log_file, Some(Some(PathBuf::from("/tmp/a.jsonl"))));
    }

    #[test]
    fn test_list_type_flag() {
        let cli =
            Cli::try_parse_from(["allowance", "lists", "create", "Snacks", "--type", "emergency"])
                .unwrap();
        match cli.command {
            Commands::Lists {
                command: ListCommands::Create { title, list_type },
            } => {
                assert_eq!(title, "Snacks");
                assert_eq!(ListType::from(list_type), ListType::Emergency);
            }
            _ => panic!("expected lists create"),
        }
    }
}
