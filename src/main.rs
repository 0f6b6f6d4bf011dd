use dotenvy::dotenv;
use maintenance_toggle::app;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible); stdout is for status lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();

    // 3. Parse, configure, connect and dispatch
    let mut stdout = std::io::stdout().lock();
    let status = app::run(
        std::env::args_os(),
        |key| std::env::var(key).ok(),
        &mut stdout,
    )
    .await;

    ExitCode::from(status)
}
