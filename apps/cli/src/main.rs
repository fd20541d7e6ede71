//! CognitiveLedger CLI - 命令行交互接口

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cl_core::EventKind;
use cl_ledger::{CognitiveLedger, LedgerConfig};

/// 配置文件路径环境变量
const CONFIG_ENV: &str = "COGLEDGER_CONFIG";

fn load_config() -> anyhow::Result<LedgerConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => LedgerConfig::load(&path)
            .with_context(|| format!("failed to load ledger config from {}", path)),
        Err(_) => Ok(LedgerConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cogledger_cli=info,cl_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = load_config()?;
    tracing::info!(ledger = %config.name, snapshot_every = config.snapshot_every, "config loaded");
    let mut ledger = CognitiveLedger::with_config(config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("run") => {
            let ok = ledger.run();
            println!("{}", ok);
            if !ok {
                anyhow::bail!("journal verification failed");
            }
            return Ok(());
        }
        Some(other) => {
            anyhow::bail!("unknown command: {} (expected `run` or no arguments)", other);
        }
        None => {}
    }

    println!("CognitiveLedger CLI v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("cl> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "help" => {
                println!("Available commands:");
                println!("  help                 - Show this help message");
                println!("  run                  - Run one verification cycle");
                println!("  record <kind> <text> - Record a cognitive event");
                println!("  verify               - Verify the hash chain");
                println!("  status               - Show ledger status");
                println!("  snapshots            - List retained snapshots");
                println!("  quit / exit          - Exit the CLI");
            }
            "run" => {
                println!("{}", ledger.run());
            }
            "record" => {
                let (kind, text) = match rest.split_once(char::is_whitespace) {
                    Some((kind, text)) => (kind, text.trim()),
                    None => (rest, ""),
                };
                if kind.is_empty() {
                    println!("Usage: record <kind> <text>");
                    continue;
                }
                match ledger.record(EventKind::parse(kind), serde_json::json!(text)) {
                    Ok(event) => println!("Recorded {} ({})", event.kind, event.id),
                    Err(e) => println!("Rejected: {}", e),
                }
            }
            "verify" => match ledger.verify() {
                Ok(()) => println!("Chain OK ({} entries)", ledger.len()),
                Err(e) => println!("Chain broken: {}", e),
            },
            "status" => {
                println!("{}", serde_json::to_string_pretty(&ledger.summary())?);
            }
            "snapshots" => {
                if ledger.snapshots().count() == 0 {
                    println!("Snapshots: (none)");
                }
                for snapshot in ledger.snapshots().iter() {
                    println!(
                        "  {} seq={} head={} at {}",
                        snapshot.id,
                        snapshot.sequence,
                        hex::encode(snapshot.head),
                        snapshot.timestamp.to_rfc3339()
                    );
                }
            }
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type 'help' for available commands.");
            }
        }
    }

    Ok(())
}
