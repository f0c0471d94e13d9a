use std::time::Instant;

use fardel_common::{Chunk, ChunkKind, EdgeType, Graph, Item, ModuleId};
use fardel_utils::indexmap::{FxIndexMap, FxIndexSet};
use rustc_hash::FxHashSet;

type Key = (ModuleId, EdgeType);

/// How the dependencies of one pass were reached.
struct Reach {
  /// The first item that reached the module.
  item: Item,
  roots: FxIndexSet<usize>,
  parents: FxHashSet<Key>,
}

pub struct SplitStage<'a> {
  graph: &'a Graph,
  roots: Vec<(Item, ChunkKind)>,
  root_keys: FxHashSet<Key>,
}

impl<'a> SplitStage<'a> {
  pub fn new(graph: &'a Graph, entries: &[Item]) -> Self {
    let mut stage = Self { graph, roots: vec![], root_keys: FxHashSet::default() };
    for entry in entries {
      stage.add_root(entry.clone(), ChunkKind::Entry);
    }
    stage
  }

  /// Partitions the graph into chunks. Every module is inlined into the chunk that reaches it
  /// unless it is reached through a non-static edge, from more than one chunk, or from a chunk
  /// whose format cannot host it. Passes repeat until no chunk root is added.
  pub fn split(mut self) -> Vec<Chunk> {
    let start = Instant::now();
    let mut passes = 0;

    let dependency_items = loop {
      passes += 1;
      let mut changed = false;
      let mut reached: FxIndexMap<Key, Reach> = FxIndexMap::default();
      let mut dependency_items = vec![];

      let mut root_idx = 0;
      while root_idx < self.roots.len() {
        let items = self.walk_root(root_idx, &mut reached, &mut changed);
        dependency_items.push(items);
        root_idx += 1;
      }

      let promoted = reached
        .iter()
        .filter(|(_, reach)| {
          reach.roots.len() > 1
            && reach.parents.iter().any(|parent| {
              self.root_keys.contains(parent)
                || reached.get(parent).is_none_or(|parent| parent.roots.len() <= 1)
            })
        })
        .map(|(_, reach)| reach.item.clone())
        .collect::<Vec<_>>();
      for item in promoted {
        changed |= self.add_root(item, ChunkKind::Shared);
      }

      if !changed {
        break dependency_items;
      }
    };

    let chunks = self
      .roots
      .into_iter()
      .zip(dependency_items)
      .map(|((item, kind), dependency_items)| Chunk { item, dependency_items, kind })
      .collect::<Vec<_>>();

    tracing::info!(chunks = chunks.len(), passes, elapsed = ?start.elapsed(), "split chunks");
    chunks
  }

  /// Pre-order walk over the static edges of a root in declaration order, first occurrence
  /// wins. Returns the items inlined into the root.
  fn walk_root(
    &mut self,
    root_idx: usize,
    reached: &mut FxIndexMap<Key, Reach>,
    changed: &mut bool,
  ) -> Vec<Item> {
    let graph = self.graph;
    let root_item = self.roots[root_idx].0.clone();
    let Some(root) = graph.get(root_item.id(), root_item.edge_type) else {
      return vec![];
    };
    let root_format = root.format;

    let mut inlined = vec![];
    let mut visited = FxHashSet::default();
    let mut stack = vec![root_item];
    let mut is_root = true;

    while let Some(item) = stack.pop() {
      if !is_root {
        if !visited.insert(item.key()) {
          continue;
        }
        inlined.push(item.clone());
      }
      is_root = false;

      let Some(asset) = graph.get(item.id(), item.edge_type) else {
        continue;
      };

      let mut children = vec![];
      for edge in asset.dependencies.ordered() {
        let key = (edge.target.clone(), edge.edge_type);
        let Some(target) = graph.get(&edge.target, edge.edge_type) else {
          continue;
        };
        let child = item.child(edge.target.clone(), edge.edge_type, target.format);

        if self.root_keys.contains(&key) {
          continue;
        }
        if !edge.edge_type.is_static() {
          *changed |= self.add_root(child, ChunkKind::Async(edge.edge_type));
          continue;
        }
        if !root_format.can_inline(target.format) {
          *changed |= self.add_root(child, ChunkKind::Isolated);
          continue;
        }

        let reach = reached.entry(key).or_insert_with(|| Reach {
          item: child.clone(),
          roots: FxIndexSet::default(),
          parents: FxHashSet::default(),
        });
        reach.roots.insert(root_idx);
        reach.parents.insert(item.key());
        children.push(child);
      }
      stack.extend(children.into_iter().rev());
    }

    inlined
  }

  fn add_root(&mut self, item: Item, kind: ChunkKind) -> bool {
    if self.root_keys.insert(item.key()) {
      tracing::debug!(id = %item.id(), ?kind, "new chunk root");
      self.roots.push((item, kind));
      true
    } else {
      false
    }
  }
}

#[cfg(test)]
mod tests {
  use fardel_common::{Asset, Dependencies, EdgeDescriptor, ExportSurface, Format};
  use smallvec::smallvec;

  use super::*;

  fn graph(modules: &[(&str, EdgeType, &[(&str, EdgeType)])]) -> Graph {
    let mut graph = Graph::default();
    for (id, edge_type, edges) in modules {
      let mut dependencies = Dependencies::default();
      for (order, (target, edge_type)) in edges.iter().enumerate() {
        let target = ModuleId::from(*target);
        dependencies.imports.insert(
          (target.clone(), *edge_type),
          EdgeDescriptor {
            format: Format::from_id(&target),
            target,
            edge_type: *edge_type,
            requests: smallvec![],
            order: u32::try_from(order).unwrap(),
            bindings: Default::default(),
          },
        );
      }
      let id = ModuleId::from(*id);
      graph.insert(Asset {
        format: Format::from_id(&id),
        stable_id: id.to_string(),
        id,
        repr_name: String::new(),
        edge_type: *edge_type,
        output_path: String::new(),
        dependencies,
        export_surface: ExportSurface::default(),
        as_script: false,
        modified: None,
      });
    }
    graph
  }

  fn entries(ids: &[&str]) -> Vec<Item> {
    ids
      .iter()
      .map(|id| {
        let id = ModuleId::from(*id);
        let format = Format::from_id(&id);
        Item::entry(id, format)
      })
      .collect()
  }

  fn layout(chunks: &[Chunk]) -> Vec<(String, Vec<String>)> {
    chunks
      .iter()
      .map(|chunk| {
        let inlined = chunk.dependency_items.iter().map(|item| item.id().to_string()).collect();
        (chunk.root().to_string(), inlined)
      })
      .collect()
  }

  const STATIC: EdgeType = EdgeType::StaticImportExport;

  #[test]
  fn inlines_a_single_chain() {
    let graph = graph(&[
      ("/a.js", STATIC, &[("/b.js", STATIC)]),
      ("/b.js", STATIC, &[("/c.js", STATIC)]),
      ("/c.js", STATIC, &[]),
    ]);
    let chunks = SplitStage::new(&graph, &entries(&["/a.js"])).split();
    let inlined = vec!["/b.js".to_string(), "/c.js".to_string()];
    assert_eq!(layout(&chunks), [("/a.js".to_string(), inlined)]);
  }

  #[test]
  fn promotes_shared_dependencies_once() {
    let graph = graph(&[
      ("/a.js", STATIC, &[("/c.js", STATIC)]),
      ("/b.js", STATIC, &[("/c.js", STATIC)]),
      ("/c.js", STATIC, &[("/d.js", STATIC)]),
      ("/d.js", STATIC, &[]),
    ]);
    let chunks = SplitStage::new(&graph, &entries(&["/a.js", "/b.js"])).split();
    assert_eq!(
      layout(&chunks),
      [
        ("/a.js".to_string(), vec![]),
        ("/b.js".to_string(), vec![]),
        ("/c.js".to_string(), vec!["/d.js".to_string()]),
      ]
    );
    assert_eq!(chunks[2].kind, ChunkKind::Shared);
  }

  #[test]
  fn non_static_edges_and_foreign_formats_get_their_own_chunk() {
    let graph = graph(&[
      (
        "/a.js",
        STATIC,
        &[("/b.js", EdgeType::DynamicImport), ("/a.css", STATIC), ("/d.json", STATIC)],
      ),
      ("/b.js", EdgeType::DynamicImport, &[]),
      ("/a.css", STATIC, &[]),
      ("/d.json", STATIC, &[]),
    ]);
    let chunks = SplitStage::new(&graph, &entries(&["/a.js"])).split();
    assert_eq!(
      layout(&chunks),
      [
        ("/a.js".to_string(), vec!["/d.json".to_string()]),
        ("/b.js".to_string(), vec![]),
        ("/a.css".to_string(), vec![]),
      ]
    );
    assert_eq!(chunks[1].kind, ChunkKind::Async(EdgeType::DynamicImport));
    assert_eq!(chunks[2].kind, ChunkKind::Isolated);
  }
}
