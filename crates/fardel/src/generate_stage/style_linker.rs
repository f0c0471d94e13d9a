use fardel_adapter::source_text;
use fardel_common::SourceJoiner;
use fardel_error::BuildDiagnostic;
use fardel_utils::concat_string;

use super::chunk_context::ChunkContext;

/// Concatenates the stylesheets of a chunk, imported sheets first. `@import` rules of inlined
/// sheets are dropped and every other reference points at its output.
pub fn link_styles(ctx: &ChunkContext) -> Result<String, BuildDiagnostic> {
  let mut joiner = SourceJoiner::default();

  for module in ctx.sorted_modules() {
    let asset = module.asset;
    let source = ctx.source(asset)?;
    let text = source_text(&asset.id, source)?;
    let code = ctx.adapter(module.item)?.rewrite(&asset.id, text, &|request, edge_type| {
      ctx.resolve_edge(asset, request, edge_type)
    })?;

    joiner.append_source(concat_string!("/* ", asset.stable_id, " */"));
    let code = code.trim();
    if !code.is_empty() {
      joiner.append_source(code.to_string());
    }
  }

  let mut css = joiner.join();
  css.push('\n');
  Ok(css)
}
