// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vertex_cli::{get_vertex_logo, secret::read_secret, tui::App, tui::UserSettings};
use vertex_core::{
    auth::{AuthClient, CredentialStore, FileCredentialStore},
    chat::{Conversation, HttpChatTransport, SessionStatus, StreamObserver, Turn},
    config::Config,
};

const LOCAL_CONFIG_FILE: &str = "vertex_config.yaml";

fn show_welcome_message() {
    println!("{}", get_vertex_logo());
    println!();
    println!("📈 {} - AI assistant for your portfolio", "Vertex Chat".bright_cyan());
    println!("💡 Version: {}", env!("CARGO_PKG_VERSION").bright_green());
    println!();
}

#[derive(Parser)]
#[command(
    name = "vertex-chat",
    about = "Vertex Chat - AI assistant for your trading dashboard",
    version = env!("CARGO_PKG_VERSION"),
    author = "Vertex Team"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and saved settings
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive chat (default)
    Chat,
    /// Ask one question and stream the answer to stdout
    Ask {
        /// The message to send
        message: Vec<String>,
    },
    /// Sign in and store the access token
    Login(CredentialsArgs),
    /// Create an account and store the access token
    Signup(CredentialsArgs),
    /// Forget the stored access token
    Logout,
    /// Show the signed-in account
    Whoami,
}

#[derive(clap::Args)]
struct CredentialsArgs {
    #[arg(short, long)]
    email: Option<String>,

    /// Prompted for without echo when omitted
    #[arg(short, long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Chat);

    let mut settings = UserSettings::load().unwrap_or_else(|e| {
        eprintln!("⚠️ Ignoring unreadable settings: {}", e);
        UserSettings::default()
    });

    init_logging(cli.verbose, matches!(command, Command::Chat))?;

    let config = load_config(cli.config.as_deref(), cli.base_url.as_deref(), &settings)?;
    let credentials: Arc<dyn CredentialStore> = Arc::new(open_credentials(&config)?);

    match command {
        Command::Chat => handle_chat(config, credentials).await,
        Command::Ask { message } => handle_ask(config, credentials, message.join(" ")).await,
        Command::Login(args) => {
            handle_credentials(config, credentials, args, &mut settings, cli.base_url, false).await
        }
        Command::Signup(args) => {
            handle_credentials(config, credentials, args, &mut settings, cli.base_url, true).await
        }
        Command::Logout => {
            credentials.clear()?;
            println!("👋 Signed out");
            Ok(())
        }
        Command::Whoami => handle_whoami(config, credentials).await,
    }
}

/// While the TUI owns the terminal, logs go to a file
fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let level = match (verbose, to_file) {
        (true, _) => log::LevelFilter::Debug,
        (false, true) => log::LevelFilter::Info,
        (false, false) => log::LevelFilter::Warn,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if to_file {
        let path = UserSettings::log_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// `--config`, else `vertex_config.yaml` in the working directory, else defaults.
/// The base URL comes from the flag, then saved settings, then the file.
fn load_config(path: Option<&Path>, base_url: Option<&str>, settings: &UserSettings) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_yaml(&path.to_string_lossy())?,
        None if Path::new(LOCAL_CONFIG_FILE).exists() => Config::from_yaml(LOCAL_CONFIG_FILE)?,
        None => Config::default(),
    };

    if let Some(url) = base_url.map(str::to_string).or_else(|| settings.get_base_url()) {
        config.backend = config.backend.with_base_url(url);
    }

    Ok(config)
}

fn open_credentials(config: &Config) -> Result<FileCredentialStore> {
    let path = match &config.credentials.token_file {
        Some(path) => path.clone(),
        None => UserSettings::default_token_path()?,
    };
    Ok(FileCredentialStore::new(path))
}

async fn handle_chat(config: Config, credentials: Arc<dyn CredentialStore>) -> Result<()> {
    let signed_in = credentials.token().is_some();
    let transport = HttpChatTransport::new(&config.backend, credentials)?;
    let endpoint = transport.endpoint().to_string();
    let conversation = Conversation::new(Arc::new(transport), &config.chat, &config.backend);

    let mut app = App::new(conversation, endpoint, signed_in);
    app.run().await
}

/// Prints deltas as they arrive
struct StdoutObserver;

impl StreamObserver for StdoutObserver {
    fn on_delta(&mut self, delta: &str, _turn: &Turn) {
        print!("{}", delta);
        let _ = io::stdout().flush();
    }

    fn on_finish(&mut self, status: SessionStatus, turn: &Turn) {
        match status {
            SessionStatus::Completed => println!(),
            SessionStatus::Cancelled => println!("{}", " [cancelled]".dimmed()),
            // failure text replaces the turn and was never streamed
            _ => eprintln!("\n{}", turn.content.red()),
        }
    }
}

async fn handle_ask(config: Config, credentials: Arc<dyn CredentialStore>, message: String) -> Result<()> {
    let transport = HttpChatTransport::new(&config.backend, credentials)?;
    let mut conversation = Conversation::new(Arc::new(transport), &config.chat, &config.backend);

    let Some(session) = conversation.send(&message) else {
        anyhow::bail!("Nothing to send: the message is empty");
    };

    let cancel = session.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let report = session.run(&mut StdoutObserver).await;
    ctrl_c.abort();

    let status = report.status;
    conversation.settle(report);

    if status == SessionStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn handle_credentials(
    config: Config,
    credentials: Arc<dyn CredentialStore>,
    args: CredentialsArgs,
    settings: &mut UserSettings,
    base_url: Option<String>,
    signup: bool,
) -> Result<()> {
    show_welcome_message();

    let email = match args.email.or_else(|| settings.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => read_secret("Password")?,
    };

    let client = AuthClient::new(&config.backend, credentials)?;
    let result = if signup {
        client.signup(&email, &password).await
    } else {
        client.login(&email, &password).await
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    settings.last_email = Some(email.clone());
    if base_url.is_some() {
        settings.base_url = base_url;
    }
    settings.save()?;

    println!("✅ Signed in as {}", email.bright_green());
    Ok(())
}

async fn handle_whoami(config: Config, credentials: Arc<dyn CredentialStore>) -> Result<()> {
    let client = AuthClient::new(&config.backend, credentials)?;

    match client.status().await {
        Ok(user) => {
            println!("👤 {} ({})", user.email.bright_cyan(), user.user_id);
            if user.broker_connected {
                println!("🔗 Brokers: {}", user.connected_brokers.join(", ").bright_green());
            } else {
                println!("🔗 No broker connected");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} is required", label);
    }
    Ok(value)
}
