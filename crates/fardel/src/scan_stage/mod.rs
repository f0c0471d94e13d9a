mod detect_cycles;
mod finalize_assets;
mod module_loader;
mod module_task;
mod task_context;

use std::{sync::Arc, time::Instant};

use fardel_common::{Format, Graph, Item};
use fardel_error::{BuildDiagnostic, BuildResult};
use tokio_util::sync::CancellationToken;

use self::{
  detect_cycles::detect_cycles, finalize_assets::finalize_assets, module_loader::ModuleLoader,
};
use crate::types::{SharedAdapters, SharedFileSystem, SharedOptions, SharedResolver};

#[derive(Debug)]
pub struct ScanStageOutput {
  pub graph: Graph,
  /// Resolved entries in the order they were supplied.
  pub entries: Vec<Item>,
}

pub struct ScanStage {
  fs: SharedFileSystem,
  options: SharedOptions,
  resolver: SharedResolver,
  adapters: SharedAdapters,
  cancellation: CancellationToken,
}

impl ScanStage {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    adapters: SharedAdapters,
    cancellation: CancellationToken,
  ) -> Self {
    Self { fs, options, resolver, adapters, cancellation }
  }

  pub async fn scan(&self) -> BuildResult<ScanStageOutput> {
    let start = Instant::now();

    let mut errors = vec![];
    let mut entries = Vec::with_capacity(self.options.input.len());
    for input in &self.options.input {
      match self.resolver.resolve(input, None) {
        Ok(id) => {
          let format = Format::from_id(&id);
          entries.push(Item::entry(id, format));
        }
        Err(err) => errors.push(BuildDiagnostic::Resolution {
          request: input.clone(),
          importer: self.options.cwd.to_string_lossy().into_owned(),
          reason: err.to_string(),
        }),
      }
    }
    if !errors.is_empty() {
      return Err(errors.into());
    }

    let module_loader = ModuleLoader::new(
      Arc::clone(&self.fs),
      Arc::clone(&self.options),
      Arc::clone(&self.resolver),
      Arc::clone(&self.adapters),
      self.cancellation.clone(),
    );
    let mut graph = module_loader.fetch_all_modules(entries.clone()).await?;

    let cycles = detect_cycles(&graph);
    if !cycles.is_empty() {
      let errors = cycles
        .into_iter()
        .map(|chain| BuildDiagnostic::CircularDependency {
          chain: chain.iter().map(|id| self.options.stable_id(id)).collect(),
        })
        .collect::<Vec<_>>();
      return Err(errors.into());
    }

    finalize_assets(&mut graph, &entries, &self.options);

    tracing::info!(
      modules = graph.len(),
      entries = entries.len(),
      elapsed = ?start.elapsed(),
      "scanned module graph"
    );

    Ok(ScanStageOutput { graph, entries })
  }
}
