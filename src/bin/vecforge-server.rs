use vecforge::{AppState, Config, Env, Orchestrator, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let mut listen_override: Option<String> = None;
    let mut env_file: Option<std::path::PathBuf> = None;
    let mut timeout_override: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--listen" | "--addr" => {
                listen_override = Some(args.next().ok_or("missing value for --listen/--addr")?);
            }
            "--env-file" => {
                env_file = Some(args.next().ok_or("missing value for --env-file")?.into());
            }
            "--request-timeout-secs" => {
                let raw = args
                    .next()
                    .ok_or("missing value for --request-timeout-secs")?;
                timeout_override = Some(
                    raw.parse::<u64>()
                        .map_err(|_| "invalid --request-timeout-secs")?,
                );
            }
            "--help" | "-h" => {
                println!(
                    "usage: vecforge-server [--listen HOST:PORT] [--env-file PATH] [--request-timeout-secs SECS]"
                );
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other}").into());
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vecforge=info".into()),
        )
        .init();

    let env = match env_file {
        Some(path) => Env::from_dotenv(&std::fs::read_to_string(&path)?),
        None => Env::default(),
    };

    let mut config = Config::from_env(&env)?;
    if let Some(listen) = listen_override {
        config.listen = listen;
    }
    if let Some(secs) = timeout_override {
        config.request_timeout = std::time::Duration::from_secs(secs);
    }

    let orchestrator = Orchestrator::from_config(&config);
    tracing::info!(models = ?orchestrator.model_ids(), listen = %config.listen, "starting vecforge");

    let app = router(AppState::new(orchestrator, config.request_timeout));
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
