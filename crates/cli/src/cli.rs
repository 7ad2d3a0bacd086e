use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookapi-cli")]
#[command(about = "Run and administer the bookapi service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database URL (overrides config and BOOKAPI__DATABASE__URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Migrate if configured to, then serve HTTP until interrupted
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Load demo authors and books (and optionally users)
    Seed(SeedArgs),
}

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Also create user@bookapi.com and admin@bookapi.com
    #[arg(long)]
    pub with_users: bool,

    /// Seed for the book-to-author assignment
    #[arg(long = "seed", value_name = "U64")]
    pub rng_seed: Option<u64>,
}
