//! HR Intent - Command line front end
//!
//! Classifies HR assistant messages and shows how they would be routed.
//! - One message as an argument: classify it and exit
//! - Piped stdin: classify each line, one JSON object per line
//! - Interactive terminal: development REPL

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hr_intent::config::IntentConfig;
use hr_intent::{
    ClassificationResult, IntentClassifier, PatternRegistry, Role, RouteDecision, RoutingPolicy,
    UserContext,
};

#[derive(Parser, Debug)]
#[command(name = "hr-intent")]
#[command(about = "Classify HR assistant requests and show how they are routed")]
#[command(version)]
struct Args {
    /// Message to classify (reads stdin when omitted)
    message: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "hr-intent.toml")]
    config: String,

    /// Run in development mode (local pattern file, hot reload)
    #[arg(long)]
    dev: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Role of the caller (admin, manager, employee)
    #[arg(long)]
    role: Option<Role>,

    /// User id of the caller
    #[arg(long, default_value = "cli-user")]
    user_id: String,

    /// Employee id linked to the caller
    #[arg(long)]
    employee_id: Option<String>,

    /// Caller's display name
    #[arg(long)]
    name: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

/// One line of output
#[derive(Serialize)]
struct Outcome<'a> {
    message: &'a str,
    result: &'a ClassificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<&'a RouteDecision>,
}

struct Session {
    classifier: IntentClassifier,
    policy: RoutingPolicy,
    user: UserContext,
    include_replies: bool,
    json: bool,
}

impl Session {
    fn handle(&self, message: &str) -> Result<()> {
        let result = self.classifier.classify(message, &self.user)?;
        let route = self
            .include_replies
            .then(|| self.policy.route(&result, &self.user));

        if self.json {
            let outcome = Outcome {
                message,
                result: &result,
                route: route.as_ref(),
            };
            println!("{}", serde_json::to_string(&outcome)?);
            return Ok(());
        }

        println!(
            "category:   {}\nconfidence: {:.2}\nreasoning:  {}",
            result.category, result.confidence, result.reasoning
        );
        for (key, value) in &result.attributes {
            println!("  {}: {}", key, value);
        }
        if let Some(route) = route {
            println!("reply:      {}", route.reply());
        } else if result.category.needs_clarification() {
            println!("(rephrase the message for a more specific answer)");
        }
        Ok(())
    }
}

/// Piped batch input always produces JSON lines
fn wants_json(json_flag: bool, has_message: bool, stdin_is_tty: bool) -> bool {
    json_flag || (!has_message && !stdin_is_tty)
}

fn build_registry(config: &IntentConfig) -> Result<PatternRegistry> {
    match config.resolved_patterns_path() {
        Some(path) => {
            let registry = PatternRegistry::from_path(&path)
                .map_err(|e| anyhow!("invalid pattern tables in {}: {}", path, e))?;
            info!(path = %path, "Pattern tables loaded");
            Ok(registry)
        }
        None => {
            info!("Using built-in pattern tables");
            Ok(PatternRegistry::builtin()?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Can override with RUST_LOG env var (e.g., RUST_LOG=hr_intent=debug)
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hr_intent={}", default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(args.verbose)
                .with_line_number(args.verbose),
        )
        .init();

    let config = IntentConfig::load(&args.config, args.dev)?;
    info!("Configuration loaded from {}", args.config);

    let registry = build_registry(&config)?;

    // Keep the watcher alive for the whole run
    let _watcher = match (config.watch_patterns, config.resolved_patterns_path()) {
        (true, Some(path)) => Some(registry.watch(&path)?),
        (true, None) => {
            warn!("Pattern watching requested but no pattern file exists");
            None
        }
        _ => None,
    };

    let mut user = UserContext::new(&args.user_id, args.role.unwrap_or(config.default_role));
    user.employee_id = args.employee_id;
    user.employee_name = args.name;

    let stdin_is_tty = atty::is(atty::Stream::Stdin);
    let session = Session {
        classifier: IntentClassifier::new(registry),
        policy: RoutingPolicy::new(config.routing.clone()),
        user,
        include_replies: config.include_replies,
        json: wants_json(args.json, args.message.is_some(), stdin_is_tty),
    };

    if let Some(message) = args.message.as_deref() {
        return session.handle(message);
    }

    if stdin_is_tty {
        run_dev_cli(&session);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if let Err(e) = session.handle(message) {
            warn!(error = %e, "Skipping line");
        }
    }

    Ok(())
}

/// Development REPL
fn run_dev_cli(session: &Session) {
    use std::io::{self, BufRead, Write};

    println!("\n=== HR Intent Development CLI ===");
    println!(
        "Classifying as {} ({}). Type a message, or 'quit' to exit.\n",
        session.user.display_name(),
        session.user.role
    );

    let stdin = io::stdin();
    loop {
        print!("hr> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            println!("Goodbye!");
            break;
        }

        if let Err(e) = session.handle(input) {
            println!("\nError: {}\n", e);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piped_input_is_json() {
        assert!(wants_json(false, false, false));
    }

    #[test]
    fn test_terminal_input_is_text_unless_asked() {
        assert!(!wants_json(false, false, true));
        assert!(wants_json(true, false, true));
    }

    #[test]
    fn test_single_message_follows_flag() {
        assert!(!wants_json(false, true, false));
        assert!(wants_json(true, true, false));
    }
}
