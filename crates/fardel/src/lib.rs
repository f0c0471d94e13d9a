mod bundler;
mod generate_stage;
mod scan_stage;
mod split_stage;
mod types;
mod utils;

pub use crate::{
  bundler::Bundler,
  scan_stage::ScanStageOutput,
  types::{
    bundle_output::BundleOutput,
    transform_cache::{MemoryTransformCache, TransformCache},
  },
};
pub use fardel_adapter::{AdapterRegistry, FormatAdapter};
pub use fardel_common::*;
pub use fardel_error::{BuildDiagnostic, BuildError, BuildResult};
pub use fardel_fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use tokio_util::sync::CancellationToken;
