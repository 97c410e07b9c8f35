use std::path::Path;

use washbay_core::AppConfig;

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = washbay_db::PoolConfig::from_app_config(config);
    Ok(washbay_db::connect_pool(&config.database_url, pool_config).await?)
}

/// Apply pending migrations and report how many ran.
///
/// # Errors
///
/// Returns an error if the connection or any migration fails.
pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = washbay_db::run_migrations(&pool).await?;
    pool.close().await;

    if applied == 0 {
        println!("database schema is up to date");
    } else {
        println!("applied {applied} migration(s)");
    }
    Ok(())
}

/// Validate the stores file without touching the database.
///
/// # Errors
///
/// Returns an error if the file is unreadable or fails validation.
pub(crate) fn check_seed(path: &Path) -> anyhow::Result<usize> {
    let file = washbay_core::load_stores_file(path)?;
    tracing::info!(path = %path.display(), stores = file.stores.len(), "stores file validated");
    Ok(file.stores.len())
}

/// Validate the stores file and upsert every entry in one transaction.
///
/// # Errors
///
/// Returns an error if the file fails validation or the upsert fails.
pub(crate) async fn run_seed(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let file = washbay_core::load_stores_file(path)?;
    tracing::info!(path = %path.display(), stores = file.stores.len(), "stores file validated");

    let pool = connect(config).await?;
    let (inserted, updated) = washbay_db::upsert_seed_stores(&pool, &file.stores).await?;
    pool.close().await;

    println!("seeded {inserted} new and {updated} existing store(s) from {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn check_seed_validates_the_bundled_file_without_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/stores.yaml");
        let count = check_seed(&path).expect("bundled stores file is valid");
        assert!(count > 0);
    }

    #[test]
    fn check_seed_reports_a_missing_file() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("no-such-stores.yaml");
        assert!(check_seed(&path).is_err());
    }
}
