use clap::Parser;
use expense_tracker::args::{
    Args, Command, CreateSubcommand, DeleteSubcommand, GetSubcommand, ListSubcommand,
    UpdateSubcommand,
};
use expense_tracker::{commands, error_type, Config, ErrorType, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            exit_code(error_type(&e))
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Mcp => commands::mcp(load(home).await?).await?.print(),

        Command::List(list_args) => {
            let config = load(home).await?;
            match list_args.entity() {
                ListSubcommand::Expenses(args) => commands::list_expenses(config, args.clone())
                    .await?
                    .print(),
                ListSubcommand::Categories => commands::list_categories(config).await?.print(),
            }
        }

        Command::Get(get_args) => {
            let config = load(home).await?;
            match get_args.entity() {
                GetSubcommand::Expense(args) => {
                    commands::get_expense(config, args.clone()).await?.print()
                }
                GetSubcommand::Category(args) => {
                    commands::get_category(config, args.clone()).await?.print()
                }
            }
        }

        Command::Create(create_args) => {
            let config = load(home).await?;
            match create_args.entity() {
                CreateSubcommand::Expense(args) => commands::create_expense(config, args.clone())
                    .await?
                    .print(),
                CreateSubcommand::Category(args) => {
                    commands::create_category(config, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Update(update_args) => {
            let config = load(home).await?;
            match update_args.entity() {
                UpdateSubcommand::Expense(args) => commands::update_expense(config, args.clone())
                    .await?
                    .print(),
                UpdateSubcommand::Category(args) => {
                    commands::update_category(config, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Delete(delete_args) => {
            let config = load(home).await?;
            match delete_args.entity() {
                DeleteSubcommand::Expense(args) => commands::delete_expense(config, args.clone())
                    .await?
                    .print(),
                DeleteSubcommand::Category(args) => {
                    commands::delete_category(config, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Report(report_args) => {
            let config = load(home).await?;
            commands::monthly_report(config, report_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load(home: &Path) -> Result<Config> {
    let config = Config::load(home).await?;
    debug!("Loaded config from {}", config.config_path().display());
    Ok(config)
}

/// Maps an `ErrorType` to a distinct process exit code so that scripts can tell failures apart.
fn exit_code(error_type: Option<ErrorType>) -> ExitCode {
    match error_type {
        Some(ErrorType::Validation) => ExitCode::from(2),
        Some(ErrorType::NotFound) => ExitCode::from(3),
        Some(ErrorType::ReferentialIntegrity) => ExitCode::from(4),
        _ => ExitCode::FAILURE,
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
