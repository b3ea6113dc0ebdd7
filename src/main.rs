//! TriKV - An In-Memory Key-Value Store With Three Interchangeable Backends
//!
//! This is the interactive entry point. It asks which backend to use, then
//! runs a read-eval-print loop against it until `QUIT`.

use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use trikv::commands::{CommandHandler, Outcome};
use trikv::storage::{BPlusTree, HashStore, RbTree, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    println!("TriKV v{} - in-memory key-value store", trikv::VERSION);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let store = select_backend(&mut lines).await?;
    let handler = CommandHandler::new(store);
    println!("> Ready to use");

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match handler.dispatch(&line) {
            Outcome::Quit => break,
            Outcome::Reply(reply) => {
                for line in reply.lines() {
                    println!("> {line}");
                }
            }
        }
    }

    info!("bye");
    Ok(())
}

/// Asks for the backend (and a capacity for the hash table) and builds it.
async fn select_backend(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Box<dyn Store>> {
    println!("Enter mode: [1 - HashStore, 2 - B+ Tree, 3 - RB Tree]");

    let mode = read_int(lines).await?;
    let store: Box<dyn Store> = match mode {
        1 => {
            println!("Enter HashStore capacity:");
            let capacity = read_int(lines).await?;
            info!(capacity, "using the hash backend");
            Box::new(HashStore::new(capacity.max(1) as usize))
        }
        2 => {
            info!("using the B+ tree backend");
            Box::new(BPlusTree::new())
        }
        _ => {
            info!("using the red-black tree backend");
            Box::new(RbTree::new())
        }
    };

    Ok(store)
}

/// Reads lines until one parses as an integer.
async fn read_int(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<i64> {
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("stdin closed");
        };
        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("ERROR: enter a number"),
        }
    }
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
