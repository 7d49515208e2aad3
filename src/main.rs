use minit::{cli, logger, supervisor};
use tracing::error;

#[tokio::main]
async fn main() {
    let code = run().await;
    // exit only after run() returns, so the log writer guard has flushed
    std::process::exit(code);
}

async fn run() -> i32 {
    let args = cli::parse();
    let _guard = logger::logs_tracing();

    let cfg = match args.into_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("{err:#}");
            return 1;
        }
    };

    supervisor::supervise(&cfg).await
}
