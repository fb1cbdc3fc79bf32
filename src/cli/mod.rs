mod commands;
pub use commands::*;

use colored::Colorize;

pub struct CLI;

impl CLI {
    pub fn print_header() {
        println!("{}", "=".repeat(50).bright_blue());
        println!("{}", "        Marketplace - Command Line Interface      ".bright_yellow().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!();
    }

    pub fn print_success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    pub fn print_error(message: &str) {
        eprintln!("{} {}", "❌".red(), message.red());
    }

    pub fn print_info(message: &str) {
        println!("{} {}", "ℹ️".blue(), message.blue());
    }

    pub fn print_help() {
        println!("{}", "Usage:".cyan().bold());
        println!("  marketplace [serve]   Start the HTTP API (default)");
        println!("  marketplace seed      Insert the sample catalog, users and interactions");
        println!("  marketplace help      Show this message");
        println!();
        println!("{}", "Environment:".cyan().bold());
        println!("  DATABASE_PATH         SQLite file (default: marketplace.db)");
        println!("  HOST / PORT           Bind address (default: 0.0.0.0:8080)");
        println!("  RATE_LIMIT_PER_SEC    Requests per second per client IP (default: 20)");
        println!("  RECOMMENDATION_LIMIT  Default recommendation list size (default: 10)");
        println!("  RUST_LOG              Log filter (default: info)");
    }
}
