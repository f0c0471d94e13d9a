use crate::{EdgeType, Format, ModuleId};

/// A module together with the path that reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
  /// `[target, ...ancestors up to the entry]`
  pub history: Vec<ModuleId>,
  pub edge_type: EdgeType,
  pub format: Format,
  /// How many leading entries of `history` are linked by static edges only.
  static_len: usize,
}

impl Item {
  pub fn entry(id: ModuleId, format: Format) -> Self {
    Self { history: vec![id], edge_type: EdgeType::StaticImportExport, format, static_len: 1 }
  }

  pub fn id(&self) -> &ModuleId {
    &self.history[0]
  }

  pub fn key(&self) -> (ModuleId, EdgeType) {
    (self.id().clone(), self.edge_type)
  }

  pub fn child(&self, id: ModuleId, edge_type: EdgeType, format: Format) -> Self {
    let mut history = Vec::with_capacity(self.history.len() + 1);
    history.push(id);
    history.extend(self.history.iter().cloned());
    let static_len = if edge_type.is_static() { self.static_len + 1 } else { 1 };
    Self { history, edge_type, format, static_len }
  }

  /// The chain from the first occurrence of `target` in the history down to the current module,
  /// closed with `target` again. Only ancestors reached through static edges count, so `None` if
  /// `target` is not one of them.
  pub fn cycle_to(&self, target: &ModuleId) -> Option<Vec<ModuleId>> {
    let position = self.history[..self.static_len].iter().position(|id| id == target)?;
    let mut chain = self.history[..=position].iter().rev().cloned().collect::<Vec<_>>();
    chain.push(target.clone());
    Some(chain)
  }
}

#[test]
fn test_cycle_to() {
  let a = ModuleId::from("/a.js");
  let b = ModuleId::from("/b.js");
  let c = ModuleId::from("/c.js");
  let item = Item::entry(a.clone(), Format::Script)
    .child(b.clone(), EdgeType::StaticImportExport, Format::Script)
    .child(c.clone(), EdgeType::StaticImportExport, Format::Script);

  assert_eq!(item.history, vec![c.clone(), b.clone(), a.clone()]);
  assert_eq!(item.cycle_to(&b), Some(vec![b.clone(), c.clone(), b.clone()]));
  assert_eq!(item.cycle_to(&a), Some(vec![a.clone(), b, c, a]));
  assert_eq!(item.cycle_to(&ModuleId::from("/d.js")), None);
}

#[test]
fn test_cycle_to_stops_at_async_edges() {
  let a = ModuleId::from("/a.js");
  let b = ModuleId::from("/b.js");
  let c = ModuleId::from("/c.js");
  let item = Item::entry(a.clone(), Format::Script)
    .child(b.clone(), EdgeType::DynamicImport, Format::Script)
    .child(c.clone(), EdgeType::StaticImportExport, Format::Script);

  assert_eq!(item.cycle_to(&a), None);
  assert_eq!(item.cycle_to(&b), Some(vec![b.clone(), c, b]));
}
