use dotenvy::dotenv;

use pushkind_tours::aggregation::reconcile_all;
use pushkind_tours::config::AppConfig;
use pushkind_tours::db::{create_pool, run_migrations};
use pushkind_tours::repository::DieselRepository;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    let pool = match create_pool(&config.database_url, config.busy_timeout()) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match run_migrations(&pool) {
        Ok(0) => log::info!("Database schema is up to date"),
        Ok(applied) => log::info!("Applied {applied} database migration(s)"),
        Err(e) => {
            log::error!("Failed to migrate database: {e}");
            std::process::exit(1);
        }
    }

    let repo = DieselRepository::new(pool);

    match reconcile_all(&repo) {
        Ok(report) => log::info!(
            "Reconciled tour ratings: {} recomputed, {} failed",
            report.recomputed,
            report.failed
        ),
        Err(e) => {
            log::error!("Failed to list tours for reconciliation: {e}");
            std::process::exit(1);
        }
    }
}
