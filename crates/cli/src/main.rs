mod cli;

use anyhow::Context;
use bookapi_app::{
    fixtures::{self, SeedOptions},
    Application,
};
use bookapi_kernel::settings::Settings;
use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load bookapi settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }
    bookapi_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Commands::Serve => {
            let app = Application::start(settings).await?;
            app.serve().await
        }
        Commands::Migrate => {
            let app = Application::connect(settings).await?;
            let applied = app.migrate().await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Seed(args) => {
            let app = Application::start(settings).await?;
            let options = SeedOptions {
                with_users: args.with_users,
                rng_seed: args.rng_seed,
            };
            let report = fixtures::seed(&app.context().db, &options).await?;
            if report.is_empty() {
                println!("nothing to seed, data already present");
            } else {
                println!(
                    "seeded {} author(s), {} book(s), {} user(s)",
                    report.authors, report.books, report.users
                );
            }
            Ok(())
        }
    }
}
