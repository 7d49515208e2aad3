use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::SubscriberBuilder;

/*
    @@@
    @logs_tracing();
    . Routes minit's own lifecycle lines to stderr through a non-blocking
      writer; stdout stays untouched for the supervised commands.
    . Level comes from MINIT_LOG (error..trace), defaulting to INFO.
    . Keeps the writer alive by returning the guard.
*/
pub fn logs_tracing() -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let level = std::env::var("MINIT_LOG")
        .ok()
        .and_then(|s| s.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);

    let subscriber = SubscriberBuilder::default()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_writer(non_blocking)
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global subscriber");
    guard
}
