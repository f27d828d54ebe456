use anyhow::Result;
use flowmetrics::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(name = version::NAME, version = version::VERSION, "collector starting");

    let app_config = config::AppConfig::load()?;
    let token = token::load_token(std::path::Path::new(&app_config.auth.token_file))?;

    let today = chrono::Local::now().date_naive();
    let (start, end) = app_config.date_range(today)?;

    let repo = dataset_repo::DatasetRepo::new(&app_config.storage.data_dir);
    let collection_pipeline = pipeline::CollectionPipeline::new(
        pipeline::PipelineConfig::from_app_config(&app_config),
        repo,
    )?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(());
    });

    let summary = collection_pipeline.run(start, end, &token, shutdown_rx).await?;

    tracing::info!(
        windows_succeeded = summary.windows_succeeded,
        windows_total = summary.windows_total,
        records_written = summary.records_written,
        hourly_dataset = %summary.hourly_dataset.display(),
        daily_dataset = %summary
            .daily_dataset
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".into()),
        "collection summary"
    );

    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
