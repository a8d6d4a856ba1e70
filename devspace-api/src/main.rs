use anyhow::Result;
use devspace_api::{create_app, AppState, Config};
use devspace_engine::EngineAdapter;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Held for the process lifetime so file logs are flushed
    let _log_guard = devspace_logging::init_subscriber();

    info!("Starting devspace-api service...");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: bind_addr={}, url_mode={}, workspace_base_path={}, image={}",
        config.bind_addr,
        config.url_mode,
        config.workspace_base_path.display(),
        config.image
    );

    // Probe the container engine once; requests short-circuit when it is absent.
    let docker_bin = config.docker_bin.clone();
    let engine = tokio::task::spawn_blocking(move || EngineAdapter::docker(&docker_bin)).await?;
    if let EngineAdapter::Unreachable { reason } = &engine {
        warn!("Workspace provisioning disabled: {}", reason);
    }

    let bind_addr = config.bind_addr.clone();
    let app = create_app(AppState::new(config, engine));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
