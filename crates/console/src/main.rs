//! SubSphere console
//!
//! Terminal front end for the SubSphere backend. Runs one command given on
//! the command line, or an interactive session reading commands from stdin.

mod commands;
mod shell;
mod views;

use anyhow::{Context, Result};
use shell::{Flow, Shell};
use std::env;
use std::io::{self, BufRead, Write};
use subsphere_common::{AppConfig, SubsphereClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <file>] [--base-url <url>] [command ...]\n  {program} [--config <file>] [--base-url <url>]        # interactive session\n\nFlags:\n  --config <file>     Load configuration from this file instead of config/\n  --base-url <url>    Override the backend origin\n  -h, --help          Show this help\n\nEnvironment:\n  SUBSPHERE_ENV                       Selects config/<env>\n  SUBSPHERE__API__BASE_URL            Backend origin\n  SUBSPHERE__SESSION__DIR             Where the session is persisted\n  RUST_LOG                            Log filter (overrides observability.log_level)\n\n{}",
        commands::HELP
    );
}

struct Args {
    config: Option<String>,
    base_url: Option<String>,
    command: Vec<String>,
}

fn parse_args(program: &str, mut args: impl Iterator<Item = String>) -> Args {
    let mut parsed = Args {
        config: None,
        base_url: None,
        command: Vec::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(value) => parsed.config = Some(value),
                None => {
                    eprintln!("--config requires a value");
                    print_usage(program);
                    std::process::exit(2);
                }
            },
            "--base-url" => match args.next() {
                Some(value) => parsed.base_url = Some(value),
                None => {
                    eprintln!("--base-url requires a value");
                    print_usage(program);
                    std::process::exit(2);
                }
            },
            "-h" | "--help" => {
                print_usage(program);
                std::process::exit(0);
            }
            _ => {
                parsed.command.push(arg);
                parsed.command.extend(args.by_ref());
            }
        }
    }
    parsed
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Re-quote words so a one-shot command parses like a typed line
fn join_words(words: &[String]) -> String {
    words
        .iter()
        .map(|w| {
            if w.is_empty() || w.contains(char::is_whitespace) {
                format!("\"{}\"", w)
            } else {
                w.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn run_line(shell: &Shell, line: &str) -> Flow {
    let command = match commands::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Flow::Continue,
        Err(e) => {
            eprintln!("{}", e);
            return Flow::Continue;
        }
    };

    match shell.execute(command).await {
        Ok((flow, text)) => {
            if !text.is_empty() {
                println!("{}", text.trim_end());
            }
            flow
        }
        Err(e) => {
            eprintln!("{}", e);
            Flow::Continue
        }
    }
}

async fn run_repl(shell: &Shell) -> Result<()> {
    println!("{}", banner(shell));

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("{}", shell.prompt());
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        if run_line(shell, input.trim()).await == Flow::Exit {
            break;
        }
    }
    Ok(())
}

fn banner(shell: &Shell) -> String {
    match shell.client().auth.current_user() {
        Some(user) => format!("Welcome back, {}. Type 'help' for commands.", user.email),
        None => "Welcome to SubSphere. Type 'help' for commands.".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "subsphere".to_string());
    let args = parse_args(&program, args);

    // Load configuration
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }

    init_tracing(&config);
    info!("Starting SubSphere console v{}", subsphere_common::VERSION);

    subsphere_common::metrics::register_metrics();

    let client = SubsphereClient::from_config(&config).context("Failed to initialise client")?;
    let shell = Shell::new(client);

    if args.command.is_empty() {
        run_repl(&shell).await?;
    } else {
        run_line(&shell, &join_words(&args.command)).await;
    }

    info!("Console session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Args {
        parse_args("subsphere", words.iter().map(|w| w.to_string()))
    }

    #[test]
    fn test_flags_then_command() {
        let parsed = args(&["--base-url", "http://localhost:8080/api", "subs", "upcoming", "14"]);
        assert_eq!(parsed.base_url.as_deref(), Some("http://localhost:8080/api"));
        assert_eq!(parsed.command, vec!["subs", "upcoming", "14"]);
    }

    #[test]
    fn test_command_words_are_not_flags() {
        let parsed = args(&["login", "jo@acme.io", "--config"]);
        assert_eq!(parsed.config, None);
        assert_eq!(parsed.command.len(), 3);
    }

    #[test]
    fn test_join_words_requotes() {
        let words = vec!["register".to_string(), "Acme Labs".to_string(), String::new()];
        assert_eq!(join_words(&words), r#"register "Acme Labs" """#);
        assert_eq!(
            commands::tokenize(&join_words(&words)).unwrap(),
            vec!["register", "Acme Labs", ""]
        );
    }
}
