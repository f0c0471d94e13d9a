use std::sync::Arc;

use fardel_adapter::AdapterRegistry;
use fardel_common::{BundlerOptions, Chunk, NormalizedBundlerOptions, Reload};
use fardel_error::{BuildDiagnostic, BuildResult};
use fardel_fs::OsFileSystem;
use fardel_resolver::Resolver;
use tokio_util::sync::CancellationToken;

use crate::{
  generate_stage::GenerateStage,
  scan_stage::{ScanStage, ScanStageOutput},
  split_stage::SplitStage,
  types::{
    build_state::BuildState,
    bundle_output::BundleOutput,
    transform_cache::{MemoryTransformCache, TransformCache},
    SharedAdapters, SharedFileSystem, SharedOptions, SharedResolver,
  },
  utils::normalize_options::{normalize_options, normalize_reload, NormalizeOptionsReturn},
};

/// Builds the same inputs again and again, generating only the chunks whose modules changed.
pub struct Bundler {
  fs: SharedFileSystem,
  options: SharedOptions,
  resolver: SharedResolver,
  adapters: SharedAdapters,
  cache: Arc<dyn TransformCache>,
  reload: Reload,
  state: BuildState,
  cancellation: CancellationToken,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> BuildResult<Self> {
    Self::with_file_system(options, Arc::new(OsFileSystem))
  }

  pub fn with_file_system(options: BundlerOptions, fs: SharedFileSystem) -> BuildResult<Self> {
    let NormalizeOptionsReturn { options, import_map } = normalize_options(options, fs.as_ref())?;
    let resolver = Resolver::new(options.cwd.clone(), import_map);

    Ok(Self {
      fs,
      reload: options.reload.clone(),
      options: Arc::new(options),
      resolver: Arc::new(resolver),
      adapters: Arc::new(AdapterRegistry::builtin()),
      cache: Arc::new(MemoryTransformCache::new()),
      state: BuildState::default(),
      cancellation: CancellationToken::new(),
    })
  }

  #[must_use]
  pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
    self.adapters = Arc::new(adapters);
    self
  }

  #[must_use]
  pub fn with_transform_cache(mut self, cache: Arc<dyn TransformCache>) -> Self {
    self.cache = cache;
    self
  }

  pub fn options(&self) -> &NormalizedBundlerOptions {
    &self.options
  }

  /// Cancelling the token stops the running build before its next phase, or the next build if
  /// none is running. A build that stopped this way leaves a fresh token behind, so later builds
  /// run again.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancellation.clone()
  }

  /// Which unchanged modules the next builds generate anyway.
  pub fn set_reload(&mut self, reload: Reload) {
    self.reload = normalize_reload(reload, &self.options.cwd);
  }

  pub async fn scan(&self) -> BuildResult<ScanStageOutput> {
    ScanStage::new(
      Arc::clone(&self.fs),
      Arc::clone(&self.options),
      Arc::clone(&self.resolver),
      Arc::clone(&self.adapters),
      self.cancellation.clone(),
    )
    .scan()
    .await
  }

  pub fn split(scan_output: &ScanStageOutput) -> Vec<Chunk> {
    SplitStage::new(&scan_output.graph, &scan_output.entries).split()
  }

  /// Generates every chunk without writing anything. Chunks that fail are reported in the output.
  /// Nothing is remembered for the next build since nothing reached the output directory.
  pub async fn build(&mut self) -> BuildResult<BundleOutput> {
    let (output, _) = self.generate().await?;
    Ok(output)
  }

  /// Builds and writes every generated chunk. Fails if any chunk failed, after the others were
  /// written.
  pub async fn write(&mut self) -> BuildResult<BundleOutput> {
    let (mut output, state) = self.generate().await?;
    self.write_output(&output)?;
    self.state = state;
    if !output.failed.is_empty() {
      let failed = std::mem::take(&mut output.failed);
      return Err(failed.into_iter().map(|(_, err)| err).collect::<Vec<_>>().into());
    }
    Ok(output)
  }

  /// Runs one build and returns its output along with the state to keep once it is written.
  async fn generate(&mut self) -> BuildResult<(BundleOutput, BuildState)> {
    let result = self.run().await;
    if self.cancellation.is_cancelled() {
      self.cancellation = CancellationToken::new();
    }
    result
  }

  async fn run(&self) -> BuildResult<(BundleOutput, BuildState)> {
    let scan_output = self.scan().await?;
    self.check_cancelled()?;

    let chunks = Self::split(&scan_output);
    self.check_cancelled()?;

    let graph = &scan_output.graph;
    let changed = self.state.changed_modules(graph, &self.reload);
    for id in &changed {
      self.cache.invalidate(id);
    }

    let output = GenerateStage {
      graph,
      chunks: &chunks,
      options: &self.options,
      adapters: &self.adapters,
      cache: self.cache.as_ref(),
      fs: self.fs.as_ref(),
      state: &self.state,
      changed: &changed,
    }
    .generate();

    let mut state = self.state.clone();
    state.record_modules(graph);
    for chunk in &chunks {
      let Some(root) = graph.get(chunk.root(), chunk.item.edge_type) else {
        continue;
      };
      if output.failed.iter().any(|(filename, _)| *filename == root.output_path) {
        state.forget_output(&root.output_path);
      } else {
        state.record_output(root.output_path.clone(), chunk);
      }
    }

    Ok((output, state))
  }

  /// Writes the generated chunks of `output` into the output directory.
  pub fn write_output(&self, output: &BundleOutput) -> BuildResult<()> {
    let out_dir = self.options.out_dir();
    for asset in &output.assets {
      let path = out_dir.join(&asset.filename);
      if let Some(parent) = path.parent() {
        self
          .fs
          .create_dir_all(parent)
          .map_err(|err| BuildDiagnostic::io(parent.to_string_lossy(), err))?;
      }
      self
        .fs
        .write(&path, asset.content_as_bytes())
        .map_err(|err| BuildDiagnostic::io(path.to_string_lossy(), err))?;
    }
    Ok(())
  }

  fn check_cancelled(&self) -> Result<(), BuildDiagnostic> {
    if self.cancellation.is_cancelled() {
      Err(BuildDiagnostic::Cancelled)
    } else {
      Ok(())
    }
  }
}
