pub mod build_state;
pub mod bundle_output;
pub mod transform_cache;

use std::sync::Arc;

use fardel_adapter::AdapterRegistry;
use fardel_common::NormalizedBundlerOptions;
use fardel_fs::FileSystem;
use fardel_resolver::Resolver;

pub type SharedOptions = Arc<NormalizedBundlerOptions>;
pub type SharedResolver = Arc<Resolver>;
pub type SharedFileSystem = Arc<dyn FileSystem>;
pub type SharedAdapters = Arc<AdapterRegistry>;
