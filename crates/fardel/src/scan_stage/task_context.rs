use std::{path::Path, time::SystemTime};

use dashmap::DashMap;
use fardel_common::{ModuleId, StrOrBytes};
use fardel_error::BuildDiagnostic;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use super::module_loader::ModuleLoaderMsg;
use crate::types::{SharedAdapters, SharedFileSystem, SharedOptions, SharedResolver};

/// Used to store common data shared between all tasks.
pub struct TaskContext {
  pub fs: SharedFileSystem,
  pub options: SharedOptions,
  pub resolver: SharedResolver,
  pub adapters: SharedAdapters,
  pub tx: Sender<ModuleLoaderMsg>,
  pub cancellation: CancellationToken,
  /// Content read during this build, once per specifier whatever edge reached it.
  sources: DashMap<ModuleId, (StrOrBytes, Option<SystemTime>)>,
}

impl TaskContext {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    adapters: SharedAdapters,
    tx: Sender<ModuleLoaderMsg>,
    cancellation: CancellationToken,
  ) -> Self {
    Self { fs, options, resolver, adapters, tx, cancellation, sources: DashMap::default() }
  }

  pub fn load_source(
    &self,
    id: &ModuleId,
  ) -> Result<(StrOrBytes, Option<SystemTime>), BuildDiagnostic> {
    if let Some(loaded) = self.sources.get(id) {
      return Ok(loaded.value().clone());
    }

    let path = Path::new(id.inner().as_str());
    let bytes = self.fs.read(path).map_err(|err| BuildDiagnostic::io(id.to_string(), err))?;
    let loaded = (StrOrBytes::from_bytes(bytes), self.fs.modified(path).ok());
    Ok(self.sources.entry(id.clone()).or_insert(loaded).value().clone())
  }
}
