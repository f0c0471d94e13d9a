use std::sync::Arc;

use fardel_common::{EdgeType, Graph, Item, ModuleId};
use fardel_error::{BuildDiagnostic, BuildResult};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use super::{
  module_task::{ModuleTask, ModuleTaskResult},
  task_context::TaskContext,
};
use crate::types::{SharedAdapters, SharedFileSystem, SharedOptions, SharedResolver};

pub enum ModuleLoaderMsg {
  ModuleDone(Box<ModuleTaskResult>),
  BuildErrors(Vec<BuildDiagnostic>),
}

pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  visited: FxHashSet<(ModuleId, EdgeType)>,
}

impl ModuleLoader {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    adapters: SharedAdapters,
    cancellation: CancellationToken,
  ) -> Self {
    // 1024 should be enough for most cases
    // over 1024 pending tasks are insane
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    let shared_context =
      Arc::new(TaskContext::new(fs, options, resolver, adapters, tx, cancellation));

    Self { rx, remaining: 0, shared_context, visited: FxHashSet::default() }
  }

  /// Loads every module reachable from `entries`. The graph is keyed, so the order in which
  /// tasks finish does not show in it: assets are stored sorted by specifier and edge type.
  pub async fn fetch_all_modules(mut self, entries: Vec<Item>) -> BuildResult<Graph> {
    for entry in entries {
      self.try_spawn_new_task(entry);
    }

    let mut errors = vec![];
    let mut loaded = vec![];

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };

      match msg {
        ModuleLoaderMsg::ModuleDone(task_result) => {
          let ModuleTaskResult { asset, source, children } = *task_result;
          if !self.shared_context.cancellation.is_cancelled() {
            for child in children {
              self.try_spawn_new_task(child);
            }
          }
          loaded.push((asset, source));
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildErrors(errs) => {
          errors.extend(errs);
          self.remaining -= 1;
        }
      }
    }

    if self.shared_context.cancellation.is_cancelled() {
      return Err(BuildDiagnostic::Cancelled.into());
    }

    if !errors.is_empty() {
      errors.sort_by_cached_key(ToString::to_string);
      return Err(errors.into());
    }

    loaded.sort_unstable_by(|(a, _), (b, _)| (&a.id, a.edge_type).cmp(&(&b.id, b.edge_type)));
    let mut graph = Graph::default();
    for (asset, source) in loaded {
      graph.set_source(asset.id.clone(), source);
      graph.insert(asset);
    }

    Ok(graph)
  }

  fn try_spawn_new_task(&mut self, item: Item) {
    if self.visited.insert(item.key()) {
      self.remaining += 1;
      let task = ModuleTask::new(Arc::clone(&self.shared_context), item);
      tokio::spawn(task.run());
    }
  }
}
