use fardel_utils::concat_string;
use oxc::syntax::keyword::{GLOBAL_OBJECTS, RESERVED_KEYWORDS};
use rustc_hash::FxHashSet;

/// Hands out the top-level names of a merged scope. A name that is taken gets the smallest free
/// numeric suffix: `x` becomes `x1`, `foo3` becomes `foo4`.
#[derive(Debug)]
pub struct Renamer {
  used_names: FxHashSet<String>,
}

impl Renamer {
  pub fn new() -> Self {
    let used_names = ["Object", "Promise"]
      .iter()
      .chain(RESERVED_KEYWORDS.iter())
      .chain(GLOBAL_OBJECTS.iter())
      .map(|name| (*name).to_string())
      .collect();
    Self { used_names }
  }

  pub fn reserve(&mut self, name: &str) {
    if !self.used_names.contains(name) {
      self.used_names.insert(name.to_string());
    }
  }

  /// Claims `hint` or the first free suffixed variant of it. Suffixed names also have to stay
  /// clear of `nested_names`, the bindings of the claiming module's inner scopes.
  pub fn create_conflictless_name(
    &mut self,
    hint: &str,
    nested_names: &FxHashSet<String>,
  ) -> String {
    if !self.used_names.contains(hint) {
      self.used_names.insert(hint.to_string());
      return hint.to_string();
    }

    let base = hint.trim_end_matches(|char: char| char.is_ascii_digit());
    let (base, mut next) = if base.is_empty() || base.len() == hint.len() {
      (hint, 1)
    } else {
      (base, hint[base.len()..].parse::<u64>().map_or(1, |count| count + 1))
    };

    let mut buffer = itoa::Buffer::new();
    loop {
      let suffix = buffer.format(next);
      let candidate = concat_string!(base, suffix);
      if !self.used_names.contains(&candidate) && !nested_names.contains(&candidate) {
        self.used_names.insert(candidate.clone());
        return candidate;
      }
      next += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn suffixes_taken_names() {
    let nested = FxHashSet::default();
    let mut renamer = Renamer::new();
    assert_eq!(renamer.create_conflictless_name("x", &nested), "x");
    assert_eq!(renamer.create_conflictless_name("x", &nested), "x1");
    assert_eq!(renamer.create_conflictless_name("x", &nested), "x2");
    assert_eq!(renamer.create_conflictless_name("foo3", &nested), "foo3");
    assert_eq!(renamer.create_conflictless_name("foo3", &nested), "foo4");
  }

  #[test]
  fn skips_nested_names_and_reserved_words() {
    let nested = FxHashSet::from_iter(["value1".to_string()]);
    let mut renamer = Renamer::new();
    renamer.reserve("value");
    assert_eq!(renamer.create_conflictless_name("value", &nested), "value2");
    assert_eq!(renamer.create_conflictless_name("Promise", &FxHashSet::default()), "Promise1");
    assert_eq!(renamer.create_conflictless_name("class", &FxHashSet::default()), "class1");
  }
}
