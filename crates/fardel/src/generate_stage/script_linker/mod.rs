mod resolve_export;

use arcstr::ArcStr;
use fardel_adapter::ResolvedEdge;
use fardel_common::{Asset, EdgeType, ModuleId, SourceJoiner};
use fardel_ecmascript::{LinkAnalysis, LocalKind, ScannedEdgeKind, Span};
use fardel_error::BuildDiagnostic;
use fardel_utils::{
  concat_string,
  ecmascript::{js_string_literal, property_access_str, property_key},
  indexmap::FxIndexMap,
};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use string_wizard::MagicString;

use self::resolve_export::{Binding, Target};
use super::chunk_context::{ChunkContext, ChunkModule};
use crate::utils::renamer::Renamer;

const LOAD_DEFAULT: &str = "loadDefault";

/// A separately chunked module some merged module imports statically.
struct External<'a> {
  asset: &'a Asset,
  binding: String,
}

/// Merges script modules into one scope. Modules come dependencies first and the last one is the
/// chunk root: the output's default export is a promise of the root's export record.
pub struct ScriptLinker<'a, 'ctx> {
  ctx: &'ctx ChunkContext<'a>,
  modules: Vec<ChunkModule<'a>>,
  sources: Vec<ArcStr>,
  analyses: Vec<LinkAnalysis>,
  module_indexes: FxHashMap<&'a ModuleId, usize>,
  externals: FxIndexMap<ModuleId, External<'a>>,
  renamer: Renamer,
  /// Final top-level names, by module and local.
  names: Vec<Vec<String>>,
  /// The binding holding the export record promise of each non-root module.
  exports_names: Vec<Option<String>>,
  /// Declarations replacing import statements, by module and statement.
  import_declarations: Vec<FxHashMap<usize, Vec<String>>>,
}

impl<'a, 'ctx> ScriptLinker<'a, 'ctx> {
  pub fn new(
    ctx: &'ctx ChunkContext<'a>,
    modules: Vec<(ChunkModule<'a>, ArcStr)>,
  ) -> Result<Self, BuildDiagnostic> {
    let mut analyses = Vec::with_capacity(modules.len());
    for (module, source) in &modules {
      let default_name = concat_string!(module.asset.repr_name, "_default");
      let analysis = LinkAnalysis::analyze(source.clone(), &default_name)
        .map_err(|err| BuildDiagnostic::transform(module.asset.stable_id.clone(), err))?;
      analyses.push(analysis);
    }

    let (modules, sources): (Vec<_>, Vec<_>) = modules.into_iter().unzip();
    let module_indexes =
      modules.iter().enumerate().map(|(idx, module)| (&module.asset.id, idx)).collect();

    Ok(Self {
      ctx,
      modules,
      sources,
      analyses,
      module_indexes,
      externals: FxIndexMap::default(),
      renamer: Renamer::new(),
      names: vec![],
      exports_names: vec![],
      import_declarations: vec![],
    })
  }

  pub fn link(mut self) -> Result<String, BuildDiagnostic> {
    self.collect_externals()?;
    self.reserve_names();
    for idx in 0..self.modules.len() {
      self.assign_names(idx)?;
    }
    self.render()
  }

  fn is_root(&self, idx: usize) -> bool {
    idx + 1 == self.modules.len()
  }

  /// Every static request whose target is not merged into this chunk, in source order.
  fn collect_externals(&mut self) -> Result<(), BuildDiagnostic> {
    for (idx, analysis) in self.analyses.iter().enumerate() {
      let requests = analysis
        .imports
        .iter()
        .map(|stmt| (stmt.span.start, &stmt.request))
        .chain(analysis.reexports.iter().map(|stmt| (stmt.span.start, &stmt.request)))
        .chain(analysis.star_exports.iter().map(|stmt| (stmt.span.start, &stmt.request)))
        .sorted_by_key(|(start, _)| *start);

      let importer = self.modules[idx].asset;
      for (_, request) in requests {
        let edge = importer
          .dependencies
          .find_request(request, EdgeType::StaticImportExport)
          .ok_or_else(|| unresolved(importer, request))?;
        if self.module_indexes.contains_key(&edge.target)
          || self.externals.contains_key(&edge.target)
        {
          continue;
        }
        let asset = self
          .ctx
          .graph
          .get(&edge.target, EdgeType::StaticImportExport)
          .ok_or_else(|| unresolved(importer, request))?;
        self.externals.insert(edge.target.clone(), External { asset, binding: String::new() });
      }
    }
    Ok(())
  }

  /// Scaffold names, globals of every module and chunk imports are claimed before any module
  /// declaration.
  fn reserve_names(&mut self) {
    self.renamer.reserve(LOAD_DEFAULT);
    for name in self.analyses.iter().flat_map(|analysis| &analysis.global_names).sorted() {
      self.renamer.reserve(name);
    }
    let no_nested_names = FxHashSet::default();
    for external in self.externals.values_mut() {
      let hint = concat_string!("import_", external.asset.repr_name);
      external.binding = self.renamer.create_conflictless_name(&hint, &no_nested_names);
    }
  }

  fn assign_names(&mut self, idx: usize) -> Result<(), BuildDiagnostic> {
    let analysis = &self.analyses[idx];
    let mut names = Vec::with_capacity(analysis.locals.len());
    let mut declarations: FxHashMap<usize, Vec<String>> = FxHashMap::default();
    let mut destructured: FxIndexMap<(usize, usize), Vec<String>> = FxIndexMap::default();

    for local in &analysis.locals {
      let LocalKind::Import { statement, imported } = &local.kind else {
        names.push(self.renamer.create_conflictless_name(&local.name, &analysis.nested_names));
        continue;
      };

      let request = &analysis.imports[*statement].request;
      let name = match self.resolve_import(idx, request, imported)? {
        Binding::Name(target) if !analysis.nested_names.contains(&target) => target,
        Binding::Name(target) => {
          let name = self.renamer.create_conflictless_name(&local.name, &analysis.nested_names);
          declarations.entry(*statement).or_default().push(concat_string!(
            "const ", name, " = ", target, ";"
          ));
          name
        }
        Binding::Namespace(module) => {
          let name = self.renamer.create_conflictless_name(&local.name, &analysis.nested_names);
          let record = self.exports_names[module].as_deref().unwrap_or_default();
          declarations.entry(*statement).or_default().push(concat_string!(
            "const ", name, " = await ", record, ";"
          ));
          name
        }
        Binding::External(external, None) => {
          let name = self.renamer.create_conflictless_name(&local.name, &analysis.nested_names);
          let binding = &self.externals[external].binding;
          declarations.entry(*statement).or_default().push(concat_string!(
            "const ", name, " = await ", binding, ";"
          ));
          name
        }
        Binding::External(external, Some(imported)) => {
          let name = self.renamer.create_conflictless_name(&local.name, &analysis.nested_names);
          let key = property_key(&imported);
          let property = if key == name { name.clone() } else { concat_string!(key, ": ", name) };
          destructured.entry((*statement, external)).or_default().push(property);
          name
        }
      };
      names.push(name);
    }

    for ((statement, external), properties) in destructured {
      let binding = &self.externals[external].binding;
      let properties = properties.join(", ");
      declarations.entry(statement).or_default().push(concat_string!(
        "const { ", properties, " } = await ", binding, ";"
      ));
    }

    // Imports without bindings still wait for a separately chunked module to finish.
    for (statement, stmt) in analysis.imports.iter().enumerate() {
      if stmt.locals.is_empty() {
        if let Target::External(external) = self.target_of(idx, &stmt.request)? {
          let binding = &self.externals[external].binding;
          declarations.entry(statement).or_default().push(concat_string!("await ", binding, ";"));
        }
      }
    }

    let exports_name = if self.is_root(idx) {
      None
    } else {
      let hint = concat_string!(self.modules[idx].asset.repr_name, "_exports");
      Some(self.renamer.create_conflictless_name(&hint, &FxHashSet::default()))
    };

    self.names.push(names);
    self.exports_names.push(exports_name);
    self.import_declarations.push(declarations);
    Ok(())
  }

  fn render(&self) -> Result<String, BuildDiagnostic> {
    let mut needs_load_default = false;
    let mut bodies = Vec::with_capacity(self.modules.len());
    for idx in 0..self.modules.len() {
      bodies.push(self.render_module(idx, &mut needs_load_default)?);
    }

    let mut joiner = SourceJoiner::default();
    for external in self.externals.values() {
      let path = js_string_literal(&self.ctx.import_path(external.asset));
      joiner.append_source(concat_string!("import ", external.binding, " from ", path, ";"));
    }
    if needs_load_default {
      joiner.append_source(concat_string!(
        "const ",
        LOAD_DEFAULT,
        " = (module) => module.default;"
      ));
    }

    for (idx, body) in bodies.into_iter().enumerate() {
      joiner.append_source(concat_string!("// ", self.modules[idx].asset.stable_id));
      let body = body.trim_end();
      if !body.is_empty() {
        joiner.append_source(body.to_string());
      }
      let record = self.export_record(idx)?;
      match &self.exports_names[idx] {
        Some(exports_name) => joiner.append_source(concat_string!(
          "const ",
          exports_name,
          " = (async () => (",
          record,
          "))();"
        )),
        None => {
          joiner.append_source(concat_string!("export default (async () => (", record, "))();"));
        }
      }
    }

    let mut output = joiner.join();
    output.push('\n');
    Ok(output)
  }

  fn render_module(
    &self,
    idx: usize,
    needs_load_default: &mut bool,
  ) -> Result<String, BuildDiagnostic> {
    let source = self.sources[idx].as_str();
    let analysis = &self.analyses[idx];
    let asset = self.modules[idx].asset;
    let names = &self.names[idx];
    let mut magic_string = MagicString::new(source);

    for (statement, stmt) in analysis.imports.iter().enumerate() {
      let (start, end) = (stmt.span.start as usize, stmt.span.end as usize);
      match self.import_declarations[idx].get(&statement) {
        Some(declarations) => {
          magic_string.update(start, end, declarations.join("\n"));
        }
        None => {
          magic_string.remove(start, end);
        }
      }
    }

    let removed = analysis
      .reexports
      .iter()
      .map(|stmt| stmt.span)
      .chain(analysis.star_exports.iter().map(|stmt| stmt.span))
      .chain(analysis.export_lists.iter().copied())
      .chain(analysis.export_prefixes.iter().copied())
      .sorted_by_key(|span| span.start)
      .dedup()
      .collect::<Vec<Span>>();
    for span in removed.into_iter().filter(|span| span.start < span.end) {
      magic_string.remove(span.start as usize, span.end as usize);
    }

    if let Some(default_export) = &analysis.default_export {
      let name = &names[default_export.local];
      magic_string.update(
        default_export.prefix.start as usize,
        default_export.prefix.end as usize,
        concat_string!("const ", name, " = "),
      );
      let end = default_export.end as usize;
      if !source.get(..end).is_some_and(|statement| statement.ends_with(';')) {
        magic_string.append_left(end, ";".to_string());
      }
    }

    for reference in &analysis.references {
      let (start, end) = (reference.span.start as usize, reference.span.end as usize);
      let original = source.get(start..end).unwrap_or_default();
      let name = &names[reference.local];
      if original == name {
        continue;
      }
      if analysis.is_shorthand(reference) {
        magic_string.update(start, end, concat_string!(original, ": ", name));
      } else {
        magic_string.update(start, end, name.clone());
      }
    }

    for dynamic_import in &analysis.dynamic_imports {
      let resolved =
        self.ctx.resolve_edge(asset, &dynamic_import.request, EdgeType::DynamicImport);
      if let Some(ResolvedEdge::Path(path)) = resolved {
        *needs_load_default = true;
        let request = js_string_literal(&path);
        magic_string.update(
          dynamic_import.span.start as usize,
          dynamic_import.span.end as usize,
          concat_string!("import(", request, ").then(", LOAD_DEFAULT, ")"),
        );
      }
    }

    for url_reference in &analysis.url_references {
      let edge_type = match url_reference.kind {
        ScannedEdgeKind::Worker => EdgeType::WebWorker,
        ScannedEdgeKind::ServiceWorker => EdgeType::ServiceWorker,
        _ => EdgeType::Fetch,
      };
      if let Some(ResolvedEdge::Path(path)) =
        self.ctx.resolve_edge(asset, &url_reference.request, edge_type)
      {
        magic_string.update(
          url_reference.span.start as usize,
          url_reference.span.end as usize,
          js_string_literal(&path),
        );
      }
    }

    Ok(magic_string.to_string())
  }

  /// The object literal a module's export record resolves to. `export *` records are spread
  /// first so that the module's own exports win.
  fn export_record(&self, idx: usize) -> Result<String, BuildDiagnostic> {
    let analysis = &self.analyses[idx];
    let mut properties = vec![];

    for star in &analysis.star_exports {
      let record = match self.target_of(idx, &star.request)? {
        Target::Inlined(module) => self.exports_names[module].clone().unwrap_or_default(),
        Target::External(external) => self.externals[external].binding.clone(),
      };
      properties.push(concat_string!("...(await ", record, ")"));
    }

    for export in &analysis.local_exports {
      properties.push(property(&export.exported, self.names[idx][export.local].clone()));
    }

    for reexport in &analysis.reexports {
      let value = match self.resolve_import(idx, &reexport.request, &reexport.imported)? {
        Binding::Name(name) => name,
        Binding::Namespace(module) => {
          concat_string!("await ", self.exports_names[module].as_deref().unwrap_or_default())
        }
        Binding::External(external, None) => {
          concat_string!("await ", self.externals[external].binding)
        }
        Binding::External(external, Some(imported)) => {
          let record = concat_string!("(await ", self.externals[external].binding, ")");
          property_access_str(&record, &imported)
        }
      };
      properties.push(property(&reexport.exported, value));
    }

    if properties.is_empty() {
      Ok("{}".to_string())
    } else {
      let properties = properties.join(", ");
      Ok(concat_string!("{ ", properties, " }"))
    }
  }
}

fn property(exported: &str, value: String) -> String {
  let key = property_key(exported);
  if key == value {
    key
  } else {
    concat_string!(key, ": ", value)
  }
}

fn unresolved(importer: &Asset, request: &str) -> BuildDiagnostic {
  BuildDiagnostic::transform(
    importer.stable_id.clone(),
    concat_string!("\"", request, "\" was not resolved while scanning"),
  )
}
