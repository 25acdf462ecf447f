use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./credit_ledger.db?mode=rwc";

/// Apply or roll back the ledger schema.
///
/// Usage: `migration [up|down|fresh|status]`; the database comes from
/// `DATABASE_URL`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let db = Database::connect(&database_url).await?;

    if !apply(&db, &command).await? {
        eprintln!("unknown command `{command}`, expected one of: up, down, fresh, status");
        std::process::exit(2);
    }

    println!("migration `{command}` done on {database_url}");
    Ok(())
}

/// Runs one command; `false` when the command is unknown.
async fn apply(db: &DatabaseConnection, command: &str) -> Result<bool, DbErr> {
    match command {
        "up" => migration::Migrator::up(db, None).await?,
        "down" => migration::Migrator::down(db, Some(1)).await?,
        "fresh" => migration::Migrator::fresh(db).await?,
        "status" => migration::Migrator::status(db).await?,
        _ => return Ok(false),
    }
    Ok(true)
}
