use std::sync::Arc;

use fardel_common::{
  Asset, Dependencies, EdgeDescriptor, EdgeType, ExportSurface, Format, Item, ModuleId,
  StrOrBytes,
};
use fardel_error::{BuildDiagnostic, BuildResult};
use fardel_utils::{ecmascript::legitimize_identifier_name, path_ext::PathExt};
use indexmap::map::Entry;
use rustc_hash::FxHashSet;
use smallvec::smallvec;
use sugar_path::SugarPath;

use super::{module_loader::ModuleLoaderMsg, task_context::TaskContext};

pub struct ModuleTaskResult {
  pub asset: Asset,
  pub source: StrOrBytes,
  /// One item per distinct edge, in declaration order.
  pub children: Vec<Item>,
}

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  item: Item,
}

impl ModuleTask {
  pub fn new(ctx: Arc<TaskContext>, item: Item) -> Self {
    Self { ctx, item }
  }

  pub async fn run(self) {
    if self.ctx.cancellation.is_cancelled() {
      let _ = self.ctx.tx.send(ModuleLoaderMsg::BuildErrors(vec![])).await;
      return;
    }

    let msg = match self.run_inner() {
      Ok(result) => ModuleLoaderMsg::ModuleDone(Box::new(result)),
      Err(errs) => ModuleLoaderMsg::BuildErrors(errs.0),
    };
    let _ = self.ctx.tx.send(msg).await;
  }

  fn run_inner(&self) -> BuildResult<ModuleTaskResult> {
    let id = self.item.id();
    let stable_id = self.ctx.options.stable_id(id);

    let adapter = self
      .ctx
      .adapters
      .select(&self.item)
      .ok_or_else(|| BuildDiagnostic::UnsupportedFormat { id: stable_id.clone() })?;
    let (source, modified) = self.ctx.load_source(id)?;
    let extracted = adapter.extract(id, &source)?;

    let mut errors = vec![];
    let mut dependencies = Dependencies::default();
    let mut children = vec![];
    let mut seen = FxHashSet::default();

    for (order, raw) in extracted.dependencies.into_iter().enumerate() {
      if raw.bindings.is_type_only() {
        continue;
      }

      let target = match self.ctx.resolver.resolve(&raw.request, Some(id)) {
        Ok(target) => target,
        Err(err) => {
          errors.push(BuildDiagnostic::Resolution {
            request: raw.request.to_string(),
            importer: stable_id.clone(),
            reason: err.to_string(),
          });
          continue;
        }
      };

      if raw.edge_type.is_static() {
        if let Some(chain) = self.item.cycle_to(&target) {
          let chain = chain.iter().map(|id| self.ctx.options.stable_id(id)).collect();
          errors.push(BuildDiagnostic::CircularDependency { chain });
          continue;
        }
      }

      let format = raw.format.unwrap_or_else(|| Format::from_id(&target));
      let key = (target.clone(), raw.edge_type);
      let edges = if raw.is_export { &mut dependencies.exports } else { &mut dependencies.imports };
      match edges.entry(key.clone()) {
        Entry::Occupied(mut occ) => {
          let edge = occ.get_mut();
          if !edge.requests.contains(&raw.request) {
            edge.requests.push(raw.request);
          }
          edge.bindings.merge(raw.bindings);
        }
        Entry::Vacant(vac) => {
          vac.insert(EdgeDescriptor {
            target: target.clone(),
            edge_type: raw.edge_type,
            format,
            requests: smallvec![raw.request],
            order: u32::try_from(order).unwrap_or(u32::MAX),
            bindings: raw.bindings,
          });
        }
      }

      if seen.insert(key) {
        children.push(self.item.child(target, raw.edge_type, format));
      }
    }

    if !errors.is_empty() {
      return Err(errors.into());
    }

    let export_surface = ExportSurface {
      named: extracted.exports.named,
      has_default: extracted.exports.has_default,
      star_targets: dependencies
        .ordered()
        .into_iter()
        .filter(|edge| edge.edge_type.is_static() && edge.bindings.star)
        .map(|edge| edge.target.clone())
        .collect(),
    };

    tracing::debug!(
      id = %stable_id,
      edge_type = %self.item.edge_type,
      dependencies = children.len(),
      "loaded module"
    );

    let asset = Asset {
      id: id.clone(),
      repr_name: repr_name(id),
      stable_id,
      edge_type: self.item.edge_type,
      format: self.item.format,
      output_path: String::new(),
      dependencies,
      export_surface,
      as_script: false,
      modified,
    };

    Ok(ModuleTaskResult { asset, source, children })
  }
}

fn repr_name(id: &ModuleId) -> String {
  let name = if id.is_url() {
    id.file_name().rsplit_once('.').map_or(id.file_name(), |(stem, _)| stem).to_string()
  } else {
    id.as_path().representative_file_name().into_owned()
  };
  legitimize_identifier_name(&name).into_owned()
}

#[test]
fn test_repr_name() {
  assert_eq!(repr_name(&ModuleId::from("/src/app-shell.ts")), "app_shell");
  assert_eq!(repr_name(&ModuleId::from("/src/button/index.ts")), "button");
  assert_eq!(repr_name(&ModuleId::from("https://cdn.test/lodash.min.js?v=1")), "lodash_min");
}
