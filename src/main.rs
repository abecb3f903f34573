//! mysql-dispatch - command line entry point.
//!
//! Runs SQL statements through the dispatcher and prints each result as JSON.

use clap::Parser;
use mysql_dispatch::config::Config;
use mysql_dispatch::models::masked_connection_string;
use mysql_dispatch::{ConnectionOptions, DbError, DbResult, Dispatcher, SqlValue, connect};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

fn parse_params(raw: &[String]) -> DbResult<Vec<SqlValue>> {
    raw.iter()
        .map(|p| {
            serde_json::from_str::<SqlValue>(p).map_err(|e| {
                DbError::invalid_input(format!(
                    "Parameter {p:?} is not a JSON value ({e}); quote strings, e.g. '\"abc\"'"
                ))
            })
        })
        .collect()
}

fn connection_options(config: &Config) -> DbResult<ConnectionOptions> {
    let mut options = ConnectionOptions::from_url(&config.url)?.with_date_strings(config.date_strings);
    if let Some(tz) = &config.timezone {
        options = options.with_timezone(tz.clone());
    }
    if config.log_queries {
        options = options.with_logging(|log| {
            info!(
                target: "mysql_dispatch::query",
                sql = %log.sql,
                parameters = ?log.parameters,
                elapsed_ms = log.elapsed.map(|d| d.as_millis() as u64),
                "Executed"
            );
        });
    }
    Ok(options)
}

fn print_outcome<T: serde::Serialize>(outcome: &T) -> DbResult<()> {
    let text = serde_json::to_string_pretty(outcome)
        .map_err(|e| DbError::invalid_input(format!("Result is not serializable: {e}")))?;
    println!("{text}");
    Ok(())
}

async fn run_all(db: &Dispatcher, config: &Config, params: &[SqlValue]) -> DbResult<()> {
    for sql in &config.statements {
        let outcome = db.execute(sql, params.to_vec()).await?;
        print_outcome(&outcome)?;
    }
    Ok(())
}

async fn run(config: &Config) -> DbResult<()> {
    let params = parse_params(&config.params)?;
    let db = connect(connection_options(config)?);

    if !config.transaction {
        return run_all(&db, config, &params).await;
    }

    let tx = db.begin_transaction().await?;
    match run_all(&tx, config, &params).await {
        Ok(()) => tx.commit().await,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    info!(
        url = %masked_connection_string(&config.url),
        statements = config.statements.len(),
        transaction = config.transaction,
        "Starting mysql-dispatch v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&config).await {
        error!(error = %e, "Execution failed");
        if let Some(suggestion) = e.suggestion() {
            eprintln!("Error: {e}\nHint: {suggestion}");
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }

    Ok(())
}
