// Wed Jan 15 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "heapscope")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Object layout, footprint and heap census inspector", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the field layout of one or more types
    Layout(LayoutArgs),
    /// Count and size everything reachable from a default-constructed instance
    Census(CensusArgs),
    /// Report the alignment profile of the running process
    Detect(DetectArgs),
}

#[derive(Parser, Debug)]
pub struct LayoutArgs {
    #[arg(short, long)]
    pub registry: PathBuf,

    #[arg(required = true)]
    pub types: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct CensusArgs {
    #[arg(short, long)]
    pub registry: PathBuf,

    pub type_name: String,

    /// Size every instance instead of the first of each type
    #[arg(long)]
    pub per_instance: bool,
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    #[arg(short, long)]
    pub sample_size: Option<usize>,
}

impl LayoutArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.registry.exists() {
            return Err(format!("Registry file does not exist: {:?}", self.registry));
        }
        Ok(())
    }
}

impl CensusArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.registry.exists() {
            return Err(format!("Registry file does not exist: {:?}", self.registry));
        }
        Ok(())
    }
}
