use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing::info;

use stowage::auth::{AuthStore, JsonFileStore, SignupRequest};
use stowage::client::{
    format_file_size, guess_mime_type, Dashboard, DashboardState, FileKind, HttpFileClient,
};
use stowage::datetime::{format_timestamp, DETAIL_DATE_FORMAT, LIST_DATE_FORMAT};
use stowage::{Config, StowageError, WebServer};

#[derive(Parser, Debug)]
#[command(name = "stowage", about = "File storage on top of an S3-compatible bucket")]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Create the local account and log in
    Signup {
        name: String,
        email: String,
        password: String,
        /// Password confirmation
        confirm_password: String,
    },
    /// Log in with the local account
    Login { email: String, password: String },
    /// Log out (the account is kept)
    Logout,
    /// Show the logged-in account
    Whoami,
    /// List stored files
    Ls,
    /// Show details of a file
    Show { key: String },
    /// Upload a file
    Upload { path: PathBuf },
    /// Delete a file
    Rm { key: String },
    /// Download a file
    Download {
        key: String,
        /// Output path (defaults to the key in the current directory)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    let result = match cli.command {
        Commands::Serve => serve(config).await,
        command => {
            stowage::logging::init_console_only("warn");
            run_client(command, &config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = stowage::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        stowage::logging::init_console_only(&config.logging.level);
    }

    config.validate()?;
    info!("Stowage file server");

    let server = WebServer::new(&config)?;
    info!("Server configured on {}", server.addr());
    server.run().await?;
    Ok(())
}

async fn run_client(command: Commands, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let auth = AuthStore::new(Arc::new(JsonFileStore::new(
        config.client.resolved_profile_path(),
    )));

    match command {
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let request =
                SignupRequest::new(name, email, password).with_confirmation(confirm_password);
            let record = auth.signup(request)?;
            println!("Account created. Logged in as {}.", record.email);
            return Ok(());
        }
        Commands::Login { email, password } => {
            let record = auth.login(&email, &password)?;
            println!("Logged in as {}.", record.email);
            return Ok(());
        }
        Commands::Logout => {
            auth.logout()?;
            println!("Logged out.");
            return Ok(());
        }
        Commands::Whoami => {
            match auth.current_session()? {
                Some(record) => println!("{} <{}>", record.name, record.email),
                None => println!("Not logged in."),
            }
            return Ok(());
        }
        _ => auth.require_login()?,
    }

    let client = HttpFileClient::new(&config.client.server_url);
    let mut dashboard = Dashboard::new(client, config.client.storage_limit_mb);
    let tz = &config.client.timezone;

    match command {
        Commands::Ls => {
            dashboard.refresh().await?;
            for file in dashboard.files() {
                println!(
                    "{:<6} {:>10}  {}  {}",
                    FileKind::from_mime(&file.mime_type).label(),
                    format_file_size(file.size),
                    format_timestamp(&file.date, tz, LIST_DATE_FORMAT),
                    file.name
                );
            }
            println!(
                "{} of {} MB used ({:.1}%)",
                format_file_size(dashboard.storage_used()),
                dashboard.storage_limit_mb(),
                dashboard.storage_percentage()
            );
        }
        Commands::Show { key } => {
            dashboard.refresh().await?;
            if !dashboard.select(&key) {
                return Err(StowageError::NotFound(format!("file {key}")).into());
            }
            if let Some(file) = dashboard.selected() {
                println!("Name:     {}", file.name);
                println!("Size:     {}", format_file_size(file.size));
                println!("Type:     {}", file.mime_type);
                println!(
                    "Modified: {}",
                    format_timestamp(&file.date, tz, DETAIL_DATE_FORMAT)
                );
                println!("URL:      {}", file.url);
            }
        }
        Commands::Upload { path } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| StowageError::Validation("No file provided".to_string()))?
                .to_string();
            let content = Bytes::from(tokio::fs::read(&path).await?);
            let content_type = guess_mime_type(&name);

            let view = dashboard.state_handle();
            let ticker = tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(100));
                loop {
                    interval.tick().await;
                    if let DashboardState::Uploading { progress } = view.state() {
                        eprint!("\rUploading... {:>3}%", progress);
                    }
                }
            });

            let result = dashboard.upload(&name, &content_type, content).await;
            ticker.abort();
            end_progress_line(&mut std::io::stderr(), result.is_ok())?;
            println!("{}", result?);
        }
        Commands::Rm { key } => {
            dashboard.delete(&key).await?;
            println!("Deleted {key}.");
        }
        Commands::Download { key, output } => {
            dashboard.refresh().await?;
            let content = dashboard.download(&key).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(&key));
            tokio::fs::write(&output, &content).await?;
            println!(
                "Saved {} to {}.",
                format_file_size(content.len() as u64),
                output.display()
            );
        }
        _ => {}
    }

    Ok(())
}

/// Terminate the `\rUploading...` line so later output starts on its own line.
fn end_progress_line(out: &mut impl Write, succeeded: bool) -> std::io::Result<()> {
    if succeeded {
        writeln!(out, "\rUploading... 100%")
    } else {
        writeln!(out)
    }
}
