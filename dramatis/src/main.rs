//! Entry point for the dramatis ingest binary.

use tracing::{info, warn};

use dramatis::{AppError, Dependencies};
use dramatis_ingest::{IngestError, RunReport};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv::dotenv().ok();
    init_tracing();

    let deps = Dependencies::new().await?;
    let pipeline = deps.pipeline.clone();

    let mut runner = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.run().await })
    };

    let report = tokio::select! {
        result = &mut runner => joined(result)?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal; finishing in-flight work");
            pipeline.shutdown();
            joined(runner.await)?
        }
    };

    if report.interrupted {
        warn!(run_id = %report.run_id, "Run interrupted before completion");
    } else {
        info!(
            run_id = %report.run_id,
            episodes = report.resolve.succeeded,
            mentions = report.resolution.mentions,
            unmatched = report.resolution.unmatched,
            "Run complete"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn joined(
    result: Result<Result<RunReport, IngestError>, tokio::task::JoinError>,
) -> Result<RunReport, AppError> {
    match result {
        Ok(inner) => inner.map_err(AppError::from),
        Err(e) => Err(AppError::from(IngestError::task_panic(e.to_string()))),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
