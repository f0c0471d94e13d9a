use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct InputArgs {
  /// Entry modules, relative to the working directory.
  pub entries: Vec<String>,

  /// Options file. `fardel.json` in the working directory is read when it exists.
  #[clap(long, short = 'c')]
  pub config: Option<PathBuf>,

  #[clap(long)]
  pub cwd: Option<PathBuf>,

  #[clap(long)]
  pub import_map: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'd')]
  pub dir: Option<String>,

  #[clap(long, short = 'm')]
  pub minify: bool,

  /// Generate every chunk, changed or not.
  #[clap(long)]
  pub reload: bool,
}

#[derive(Args)]
pub struct LogArgs {
  /// Only report errors.
  #[clap(long, short = 's', conflicts_with = "verbose")]
  pub silent: bool,

  #[clap(long, short = 'v')]
  pub verbose: bool,
}
