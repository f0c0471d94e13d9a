mod chunk_context;
mod minify;
mod script_linker;
mod style_linker;

use std::time::Instant;

use arcstr::ArcStr;
use fardel_adapter::{source_text, AdapterRegistry};
use fardel_common::{
  Chunk, EdgeType, Format, Graph, ModuleId, NormalizedBundlerOptions, OutputAsset, OutputContent,
  StrOrBytes,
};
use fardel_error::BuildDiagnostic;
use fardel_fs::FileSystem;
use fardel_utils::rayon::{IntoParallelRefIterator, ParallelIterator};
use rustc_hash::FxHashSet;

use self::{
  chunk_context::{ChunkContext, ChunkModule},
  minify::{minify_script, minify_style},
  script_linker::ScriptLinker,
  style_linker::link_styles,
};
use crate::types::{
  build_state::BuildState, bundle_output::BundleOutput, transform_cache::TransformCache,
};

enum ChunkOutcome {
  Generated(OutputAsset),
  Skipped(String),
  Failed(String, BuildDiagnostic),
}

pub struct GenerateStage<'a> {
  pub graph: &'a Graph,
  pub chunks: &'a [Chunk],
  pub options: &'a NormalizedBundlerOptions,
  pub adapters: &'a AdapterRegistry,
  pub cache: &'a dyn TransformCache,
  pub fs: &'a dyn FileSystem,
  pub state: &'a BuildState,
  /// Modules whose content has to be generated again.
  pub changed: &'a FxHashSet<ModuleId>,
}

impl GenerateStage<'_> {
  /// Generates every chunk in parallel. A chunk that fails does not stop the others.
  pub fn generate(&self) -> BundleOutput {
    let start = Instant::now();
    let outcomes =
      self.chunks.par_iter().map(|chunk| self.generate_chunk(chunk)).collect::<Vec<_>>();

    let mut output = BundleOutput::default();
    for outcome in outcomes {
      match outcome {
        ChunkOutcome::Generated(asset) => output.assets.push(asset),
        ChunkOutcome::Skipped(filename) => output.skipped.push(filename),
        ChunkOutcome::Failed(filename, err) => {
          tracing::warn!("{filename}: {err}");
          output.failed.push((filename, err));
        }
      }
    }
    output.assets.sort_by(|a, b| a.filename.cmp(&b.filename));
    output.skipped.sort();

    tracing::info!(
      generated = output.assets.len(),
      skipped = output.skipped.len(),
      failed = output.failed.len(),
      elapsed = ?start.elapsed(),
      "generated chunks"
    );
    output
  }

  fn generate_chunk(&self, chunk: &Chunk) -> ChunkOutcome {
    let Some(root) = self.graph.get(chunk.root(), chunk.item.edge_type) else {
      let id = self.options.stable_id(chunk.root());
      return ChunkOutcome::Failed(id.clone(), BuildDiagnostic::transform(id, "not loaded"));
    };
    let filename = root.output_path.clone();

    let output_file = self.options.output_file(&filename);
    if self.state.can_skip(chunk, &filename, &output_file, self.changed, self.fs) {
      tracing::debug!("{filename} is up to date");
      return ChunkOutcome::Skipped(filename);
    }

    let ctx = ChunkContext {
      graph: self.graph,
      chunk,
      root,
      options: self.options,
      adapters: self.adapters,
      cache: self.cache,
    };
    match self.render_chunk(&ctx) {
      Ok(content) => {
        let format = if root.as_script { Format::Script } else { root.format };
        tracing::debug!(modules = chunk.dependency_items.len() + 1, "generated {filename}");
        ChunkOutcome::Generated(OutputAsset { filename, content, format })
      }
      Err(err) => ChunkOutcome::Failed(filename, err),
    }
  }

  fn render_chunk(&self, ctx: &ChunkContext) -> Result<OutputContent, BuildDiagnostic> {
    let root = ctx.root;

    // Fetched resources and binary files are copied as they are.
    if matches!(root.edge_type, EdgeType::Fetch) || matches!(root.format, Format::Binary) {
      let source = ctx.source(root)?;
      let transformed = ctx.adapter(&ctx.chunk.item)?.transform(&root.id, source, false)?;
      return Ok(match transformed {
        StrOrBytes::Str(text) => OutputContent::Text(text.to_string()),
        StrOrBytes::Bytes(bytes) => OutputContent::Bytes(bytes.to_vec()),
      });
    }

    if root.is_script_like() {
      let code = self.link_script(ctx)?;
      let code = if self.options.minify { minify_script(root, &code)? } else { code };
      return Ok(OutputContent::Text(code));
    }

    if matches!(root.format, Format::Style) {
      let css = self.link_style(ctx)?;
      return Ok(OutputContent::Text(css));
    }

    let adapter = ctx.adapter(&ctx.chunk.item)?;
    let transformed = adapter.transform(&root.id, ctx.source(root)?, false)?;
    let text = source_text(&root.id, &transformed)?;
    let code = adapter.rewrite(&root.id, text, &|request, edge_type| {
      ctx.resolve_edge(root, request, edge_type)
    })?;
    Ok(OutputContent::Text(code))
  }

  fn link_style(&self, ctx: &ChunkContext) -> Result<String, BuildDiagnostic> {
    let css = link_styles(ctx)?;
    if self.options.minify {
      minify_style(ctx.root, &css)
    } else {
      Ok(css)
    }
  }

  fn link_script(&self, ctx: &ChunkContext) -> Result<String, BuildDiagnostic> {
    let root = ctx.root;
    let modules = if matches!(root.format, Format::Style) {
      // The linked stylesheet becomes the only module of the chunk.
      let css = StrOrBytes::Str(ArcStr::from(self.link_style(ctx)?));
      let transformed = ctx.adapter(&ctx.chunk.item)?.transform(&root.id, &css, true)?;
      let code = source_text(&root.id, &transformed)?.clone();
      vec![(ChunkModule { item: &ctx.chunk.item, asset: root }, code)]
    } else {
      ctx
        .sorted_modules()
        .into_iter()
        .map(|module| Ok((module, ctx.transformed(module)?)))
        .collect::<Result<Vec<_>, BuildDiagnostic>>()?
    };
    ScriptLinker::new(ctx, modules)?.link()
  }
}
