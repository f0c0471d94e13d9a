use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `--verbose` and `--silent` win over `RUST_LOG`.
pub fn init_logger(verbose: bool, silent: bool) {
  let filter = if verbose {
    EnvFilter::new("fardel=debug,fardel_adapter=debug")
  } else if silent {
    EnvFilter::new("fardel=error")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fardel=info"))
  };

  let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr).compact();
  tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
