// Tue Jan 13 2026 - Alex

pub mod cli;
pub mod spinner;

pub use spinner::ProgressSpinner;

use colored::Colorize;

pub fn print_info(message: &str) {
    println!("{} {}", "[INFO]".cyan(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "[WARN]".yellow(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red(), message);
}
