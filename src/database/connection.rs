use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::debug;

use super::migrations::Migrator;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    debug!("Connecting to {}", database_url);
    Database::connect(database_url).await
}

/// Connection URL for a `--db` value: a URL is kept, a path is opened (and
/// created if needed) as a SQLite file.
pub fn get_database_url(database: &str) -> String {
    match database {
        ":memory:" => "sqlite::memory:".to_string(),
        url if url.starts_with("sqlite:") || url.contains("://") => url.to_string(),
        path => format!("sqlite:{}?mode=rwc", path),
    }
}

/// Bring the schema up to date
pub async fn setup_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

/// Drop every table and recreate the schema
pub async fn reset_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::fresh(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_database_url() {
        assert_eq!(get_database_url(":memory:"), "sqlite::memory:");
        assert_eq!(get_database_url("samply.db"), "sqlite:samply.db?mode=rwc");
        assert_eq!(
            get_database_url("sqlite:///tmp/x.db?mode=rwc"),
            "sqlite:///tmp/x.db?mode=rwc"
        );
    }
}
