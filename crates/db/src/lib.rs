//! Database connection factory and migration tooling.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use bookapi_kernel::settings::DatabaseSettings;
use bookapi_kernel::Migration;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};

const MIGRATIONS_TABLE: &str = "schema_migrations";

/// Open a pooled connection using the configured URL.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to database at {}", settings.url))?;

    tracing::info!(
        target: "bookapi-db",
        backend = ?db.get_database_backend(),
        max_connections = settings.max_connections,
        "database connected"
    );

    Ok(db)
}

/// Cheap round trip used by the health endpoint.
pub async fn ping(db: &DatabaseConnection) -> anyhow::Result<()> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1",
    ))
    .await
    .context("database ping failed")?;
    Ok(())
}

/// Apply pending migrations in the given order, each in its own transaction.
///
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(
    db: &DatabaseConnection,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    let backend = db.get_database_backend();

    db.execute_unprepared(&format!(
        "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
            module TEXT NOT NULL,
            id TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (module, id)
        )"
    ))
    .await
    .context("failed to create migrations table")?;

    let applied = applied_migrations(db).await?;
    let mut count = 0;

    for (module, migration) in migrations {
        if applied.contains(&(module.clone(), migration.id.to_string())) {
            continue;
        }

        tracing::info!(
            target: "bookapi-db",
            module = %module,
            migration = migration.id,
            "applying migration"
        );

        let txn = db.begin().await?;
        txn.execute_unprepared(migration.up)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        txn.execute(Statement::from_sql_and_values(
            backend,
            format!("INSERT INTO {MIGRATIONS_TABLE} (module, id) VALUES (?, ?)"),
            [module.clone().into(), migration.id.into()],
        ))
        .await
        .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;
        txn.commit().await?;

        count += 1;
    }

    tracing::info!(target: "bookapi-db", applied = count, "migrations complete");
    Ok(count)
}

async fn applied_migrations(db: &DatabaseConnection) -> anyhow::Result<HashSet<(String, String)>> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT module, id FROM {MIGRATIONS_TABLE}"),
        ))
        .await
        .context("failed to read applied migrations")?;

    rows.iter()
        .map(|row| {
            Ok((
                row.try_get::<String>("", "module")?,
                row.try_get::<String>("", "id")?,
            ))
        })
        .collect::<Result<_, sea_orm::DbErr>>()
        .map_err(Into::into)
}
