// console/listener.rs

use crate::console::command_handler::{handle_command, parse_command, Command};
use crate::console::ConsoleContext;
use crate::scraper::DealSource;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Reads commands from stdin until `/quit` or end of input.
pub async fn listen_for_commands<S: DealSource>(ctx: &ConsoleContext<S>) {
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed, leaving console.");
                break;
            }
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match parse_command(text, &ctx.config.thresholds) {
            Ok(Command::Quit) => {
                println!("{}", handle_command(Command::Quit, ctx).await);
                break;
            }
            Ok(command) => println!("{}", handle_command(command, ctx).await),
            Err(e) => println!("❓ {}", e),
        }
    }
}
