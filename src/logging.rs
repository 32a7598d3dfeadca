use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize logging for the preprocessing binary.
///
/// Defaults to `info` level unless overridden by `MELPREP_LOG`. Events go to
/// stderr; stdout stays reserved for the run's summary lines.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var("MELPREP_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
