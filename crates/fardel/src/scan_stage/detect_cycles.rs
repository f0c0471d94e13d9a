use std::iter;

use fardel_common::{AssetIdx, EdgeType, Graph, ModuleId};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Status {
  ToBeExecuted(AssetIdx),
  WaitForExit(AssetIdx),
}

/// Static import cycles of the finished graph. Each chain starts and ends with the same module.
///
/// Loading checks every edge against the path that reached it, but a module reached twice is only
/// loaded once, so a cycle closed through the second path is only visible here.
pub fn detect_cycles(graph: &Graph) -> Vec<Vec<ModuleId>> {
  let mut execution_stack =
    graph.assets.indices().rev().map(Status::ToBeExecuted).collect::<Vec<_>>();

  let mut executed_ids = FxHashSet::default();
  let mut stack_indexes_of_executing_id = FxHashMap::default();
  let mut circular_dependencies = vec![];

  while let Some(status) = execution_stack.pop() {
    match status {
      Status::ToBeExecuted(idx) => {
        if executed_ids.contains(&idx) {
          if let Some(index) = stack_indexes_of_executing_id.get(&idx).copied() {
            // Only modules with `Status::WaitForExit` are on the execution chain
            let cycle = execution_stack[index..]
              .iter()
              .filter_map(|status| match status {
                Status::ToBeExecuted(_) => None,
                Status::WaitForExit(idx) => Some(graph.assets[*idx].id.clone()),
              })
              .chain(iter::once(graph.assets[idx].id.clone()))
              .collect::<Vec<_>>();
            circular_dependencies.push(cycle);
          }
        } else {
          executed_ids.insert(idx);
          execution_stack.push(Status::WaitForExit(idx));
          stack_indexes_of_executing_id.insert(idx, execution_stack.len() - 1);

          let targets = graph.assets[idx]
            .dependencies
            .static_targets()
            .filter_map(|target| graph.idx_of(target, EdgeType::StaticImportExport))
            .collect::<Vec<_>>();
          execution_stack.extend(targets.into_iter().rev().map(Status::ToBeExecuted));
        }
      }
      Status::WaitForExit(idx) => {
        stack_indexes_of_executing_id.remove(&idx);
      }
    }
  }

  circular_dependencies
}

#[cfg(test)]
mod tests {
  use fardel_common::{Asset, Dependencies, EdgeDescriptor, ExportSurface, Format};
  use smallvec::smallvec;

  use super::*;

  fn asset(id: &str, imports: &[&str]) -> Asset {
    let mut dependencies = Dependencies::default();
    for (order, target) in imports.iter().enumerate() {
      let target = ModuleId::from(*target);
      dependencies.imports.insert(
        (target.clone(), EdgeType::StaticImportExport),
        EdgeDescriptor {
          target,
          edge_type: EdgeType::StaticImportExport,
          format: Format::Script,
          requests: smallvec![],
          order: u32::try_from(order).unwrap(),
          bindings: Default::default(),
        },
      );
    }
    Asset {
      id: ModuleId::from(id),
      stable_id: id.to_string(),
      repr_name: String::new(),
      edge_type: EdgeType::StaticImportExport,
      format: Format::Script,
      output_path: String::new(),
      dependencies,
      export_surface: ExportSurface::default(),
      as_script: false,
      modified: None,
    }
  }

  #[test]
  fn finds_cycles_hidden_by_shared_modules() {
    let mut graph = Graph::default();
    graph.insert(asset("/a.js", &["/b.js"]));
    graph.insert(asset("/b.js", &["/a.js"]));
    graph.insert(asset("/main.js", &["/b.js", "/a.js"]));

    let cycles = detect_cycles(&graph);
    assert_eq!(cycles.len(), 1);
    let chain = cycles[0].iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(chain, ["/a.js", "/b.js", "/a.js"]);
  }

  #[test]
  fn diamonds_are_not_cycles() {
    let mut graph = Graph::default();
    graph.insert(asset("/main.js", &["/a.js", "/b.js"]));
    graph.insert(asset("/a.js", &["/c.js"]));
    graph.insert(asset("/b.js", &["/c.js"]));
    graph.insert(asset("/c.js", &[]));
    assert!(detect_cycles(&graph).is_empty());
  }
}
