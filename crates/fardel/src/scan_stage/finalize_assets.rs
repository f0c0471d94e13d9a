use fardel_common::{EdgeType, Format, Graph, Item, ModuleId, NormalizedBundlerOptions};
use fardel_utils::{concat_string, hash::sha256_hex};
use rustc_hash::FxHashSet;

/// Decides which assets are emitted as script modules and where every asset is written.
pub fn finalize_assets(graph: &mut Graph, entries: &[Item], options: &NormalizedBundlerOptions) {
  let mut as_script = FxHashSet::default();
  for asset in graph.iter().filter(|asset| asset.format == Format::Script) {
    for edge in asset.dependencies.ordered() {
      let consumed_as_module =
        matches!(edge.edge_type, EdgeType::StaticImportExport | EdgeType::DynamicImport);
      if consumed_as_module && matches!(edge.format, Format::Json | Format::Style) {
        as_script.insert((edge.target.clone(), edge.edge_type));
      }
    }
  }

  let entries = entries.iter().map(Item::key).collect::<FxHashSet<_>>();
  let mut used_paths = FxHashSet::default();
  for asset in graph.assets.iter_mut() {
    let key = asset.key();
    asset.as_script = asset.format != Format::Script && as_script.contains(&key);

    let extension =
      if asset.is_script_like() { Some("js") } else { asset.id.extension() }.map(str::to_string);
    let preferred = options.output_map.get(&asset.id).cloned().unwrap_or_else(|| {
      if entries.contains(&key) {
        with_extension(file_stem(&asset.id), extension.as_deref())
      } else {
        let file_name = with_extension(&sha256_hex(&asset.id), extension.as_deref());
        if asset.edge_type.is_served_from_root() || options.deps_dir.is_empty() {
          file_name
        } else {
          concat_string!(options.deps_dir.trim_end_matches('/'), "/", file_name)
        }
      }
    });

    asset.output_path = unique_path(preferred, asset.edge_type, &mut used_paths);
  }
}

fn file_stem(id: &ModuleId) -> &str {
  let file_name = id.file_name();
  file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem)
}

fn with_extension(stem: &str, extension: Option<&str>) -> String {
  match extension {
    Some(extension) => concat_string!(stem, ".", extension),
    None => stem.to_string(),
  }
}

/// Two assets never share an output: the later one is suffixed with its edge type, then with a
/// counter.
fn unique_path(path: String, edge_type: EdgeType, used: &mut FxHashSet<String>) -> String {
  if used.insert(path.clone()) {
    return path;
  }

  let (stem, extension) = match path.rsplit_once('.') {
    Some((stem, extension)) if !extension.contains('/') => (stem, Some(extension)),
    _ => (path.as_str(), None),
  };
  let tagged = concat_string!(stem, "-", edge_type.as_str());
  let mut candidate = with_extension(&tagged, extension);
  let mut counter = 1u32;
  while !used.insert(candidate.clone()) {
    counter += 1;
    let mut buffer = itoa::Buffer::new();
    let counter = buffer.format(counter);
    candidate = with_extension(&concat_string!(tagged, "-", counter), extension);
  }
  candidate
}

#[test]
fn test_unique_path() {
  let mut used = FxHashSet::default();
  let mut unique = |path: &str, edge_type| unique_path(path.to_string(), edge_type, &mut used);
  assert_eq!(unique("main.js", EdgeType::StaticImportExport), "main.js");
  assert_eq!(unique("main.js", EdgeType::DynamicImport), "main-dynamic.js");
  assert_eq!(unique("main.js", EdgeType::DynamicImport), "main-dynamic-2.js");
  assert_eq!(unique("deps/LICENSE", EdgeType::Fetch), "deps/LICENSE");
  assert_eq!(unique("deps/LICENSE", EdgeType::Fetch), "deps/LICENSE-fetch");
}
