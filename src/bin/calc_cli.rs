//! Calculation client CLI
//!
//! Terminal front end for the session client. Each subcommand is one user
//! action; `shell` keeps a single session open across many.
//!
//! # Usage
//!
//! ```bash
//! calc_cli register alice alice@example.com s3cret
//! calc_cli login alice s3cret
//! calc_cli create add 10 5
//! calc_cli list
//! calc_cli edit 3 --operand1 2 --operand2 4 --operation multiply
//! calc_cli delete 3 --yes
//! calc_cli shell
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use calc_client::prompt::{PROMPT_OPERAND1, PROMPT_OPERAND2, PROMPT_OPERATION};
use calc_client::{
    ClientConfig, FileTokenStore, InputProvider, Notice, Operation, ScriptedInput, SessionClient,
    View,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calc_cli")]
#[command(version = "0.1.0")]
#[command(about = "Register, log in and manage calculations against the calculation API")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides CALC_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Token file (overrides CALC_TOKEN_FILE)
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,
        password: String,
    },

    /// Log in and store the bearer token
    Login {
        username: String,
        /// Prompted for if omitted
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// List your calculations
    List,

    /// Show one calculation
    Show { id: i64 },

    /// Create a calculation
    Create {
        /// add, subtract, multiply or divide
        operation: Operation,
        #[arg(allow_hyphen_values = true)]
        operand1: f64,
        #[arg(allow_hyphen_values = true)]
        operand2: f64,
    },

    /// Edit a calculation; missing values are prompted for
    Edit {
        id: i64,
        #[arg(long, allow_hyphen_values = true)]
        operand1: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        operand2: Option<String>,
        #[arg(long)]
        operation: Option<String>,
    },

    /// Delete a calculation
    Delete {
        id: i64,
        /// Skip the confirmation question
        #[arg(long, short)]
        yes: bool,
    },

    /// Check the API is up
    Health,

    /// Interactive session
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "calc_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url).context("Invalid --api-url")?;
    }
    if let Some(path) = &cli.token_file {
        config = config.with_token_path(path);
    }

    let store = FileTokenStore::new(config.token_path.clone());
    let mut client =
        SessionClient::new(config, store).context("Failed to create session client")?;

    match cli.command {
        Commands::Shell => run_shell(&mut client).await,
        command => Ok(execute(&mut client, command).await),
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Run one command and print the resulting state. Returns whether it succeeded.
async fn execute(client: &mut SessionClient<FileTokenStore>, command: Commands) -> bool {
    let ok = match command {
        Commands::Register {
            username,
            email,
            password,
        } => {
            client.show_register();
            client.register(&username, &email, &password).await.is_ok()
        }
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => Some(p),
                None => TerminalInput::new().and_then(|mut t| t.prompt("Password:")),
            };
            match password {
                Some(password) => {
                    let ok = client.login(&username, &password).await.is_ok();
                    if ok {
                        print_list(client);
                    }
                    ok
                }
                None => false,
            }
        }
        Commands::Logout => {
            client.logout();
            true
        }
        Commands::List => {
            let ok = client.load_calculations().await.is_ok();
            if ok {
                print_list(client);
            }
            ok
        }
        Commands::Show { id } => match client.read_calculation(id).await {
            Ok(calc) => {
                println!("{}", calc_client::CalculationCard::from_calculation(&calc));
                true
            }
            Err(_) => false,
        },
        Commands::Create {
            operation,
            operand1,
            operand2,
        } => {
            let ok = client
                .create_calculation(operation, operand1, operand2)
                .await
                .is_ok();
            if ok {
                print_list(client);
            }
            ok
        }
        Commands::Edit {
            id,
            operand1,
            operand2,
            operation,
        } => {
            let input = FlagInput {
                operand1,
                operand2,
                operation,
                terminal: None,
            };
            let ok = client.edit_calculation(id, input).await.is_ok();
            if ok {
                print_list(client);
            }
            ok
        }
        Commands::Delete { id, yes } => {
            let ok = if yes {
                client
                    .delete_calculation(id, ScriptedInput::confirming(true))
                    .await
                    .is_ok()
            } else {
                match TerminalInput::new() {
                    Some(terminal) => client.delete_calculation(id, terminal).await.is_ok(),
                    None => false,
                }
            };
            if ok {
                print_list(client);
            }
            ok
        }
        Commands::Health => match client.health().await {
            Ok(health) => {
                println!("{} API status: {}", "OK".green(), health.status);
                true
            }
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                false
            }
        },
        Commands::Shell => {
            eprintln!("{}: already in a shell", "error".red().bold());
            false
        }
    };

    print_notice(client.notice());
    ok
}

async fn run_shell(client: &mut SessionClient<FileTokenStore>) -> Result<bool> {
    let mut editor = DefaultEditor::new().context("Failed to open terminal")?;

    let _ = client.start().await;
    print_notice(client.notice());
    if client.view() == View::Dashboard {
        print_list(client);
    }

    loop {
        let prompt = match (client.view(), client.session().username()) {
            (View::Dashboard, Some(user)) => format!("calc ({})> ", user),
            (View::Dashboard, None) => "calc> ".to_string(),
            (View::Login, _) => "calc [login]> ".to_string(),
            (View::Register, _) => "calc [register]> ".to_string(),
        };

        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        match line {
            "quit" | "exit" => break,
            "show-register" => {
                client.show_register();
                continue;
            }
            "show-login" => {
                client.show_login();
                continue;
            }
            _ => {}
        }

        let Some(words) = split_line(line) else {
            eprintln!("{}: unbalanced quotes", "error".red().bold());
            continue;
        };
        let args = std::iter::once("calc_cli".to_string()).chain(words);
        match Cli::try_parse_from(args) {
            Ok(parsed) => {
                execute(client, parsed.command).await;
            }
            Err(e) => {
                let _ = e.print();
            }
        }
    }

    Ok(true)
}

/// Shell-style word splitting, so quoted values may contain spaces.
/// `None` on unbalanced quotes.
fn split_line(line: &str) -> Option<Vec<String>> {
    shlex::split(line)
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_list(client: &SessionClient<FileTokenStore>) {
    if let Some(user) = client.session().username() {
        println!("{} {}", "Logged in as".dimmed(), user.bold());
    }
    let rendered = client.list_view().to_string();
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

fn print_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        if notice.is_error() {
            eprintln!("{}", notice.text.red());
        } else {
            println!("{}", notice.text.green());
        }
    }
}

// =============================================================================
// INPUT PROVIDERS
// =============================================================================

/// Line-editor backed prompts. Ctrl-C / Ctrl-D cancel.
struct TerminalInput {
    editor: DefaultEditor,
}

impl TerminalInput {
    fn new() -> Option<Self> {
        match DefaultEditor::new() {
            Ok(editor) => Some(Self { editor }),
            Err(e) => {
                eprintln!("{}: cannot prompt: {}", "error".red().bold(), e);
                None
            }
        }
    }
}

impl InputProvider for TerminalInput {
    fn prompt(&mut self, message: &str) -> Option<String> {
        self.editor
            .readline(&format!("{} ", message))
            .ok()
            .map(|line| line.trim().to_string())
    }

    fn confirm(&mut self, message: &str) -> bool {
        matches!(
            self.prompt(&format!("{} [y/N]", message))
                .map(|a| a.to_ascii_lowercase())
                .as_deref(),
            Some("y") | Some("yes")
        )
    }
}

/// Edit answers taken from flags, falling back to the terminal for any not given.
struct FlagInput {
    operand1: Option<String>,
    operand2: Option<String>,
    operation: Option<String>,
    /// Opened on first use
    terminal: Option<TerminalInput>,
}

impl FlagInput {
    fn terminal(&mut self) -> Option<&mut TerminalInput> {
        if self.terminal.is_none() {
            self.terminal = TerminalInput::new();
        }
        self.terminal.as_mut()
    }
}

impl InputProvider for FlagInput {
    fn prompt(&mut self, message: &str) -> Option<String> {
        let given = match message {
            PROMPT_OPERAND1 => self.operand1.take(),
            PROMPT_OPERAND2 => self.operand2.take(),
            PROMPT_OPERATION => self.operation.take(),
            _ => None,
        };
        match given {
            Some(answer) => Some(answer),
            None => self.terminal().and_then(|t| t.prompt(message)),
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.terminal().map(|t| t.confirm(message)).unwrap_or(false)
    }
}
