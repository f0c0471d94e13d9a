use std::sync::Arc;

use fardel::{BundleOutput, Bundler, BundlerOptions, FileSystem, MemoryFileSystem};

pub const CWD: &str = "/project";

pub fn file_system(files: &[(&str, &str)]) -> Arc<MemoryFileSystem> {
  Arc::new(MemoryFileSystem::with_files(
    files.iter().map(|(path, content)| (format!("{CWD}/{path}"), *content)),
  ))
}

pub fn bundler(fs: &Arc<MemoryFileSystem>, input: &[&str]) -> Bundler {
  let options = BundlerOptions {
    input: Some(input.iter().map(ToString::to_string).collect()),
    cwd: Some(CWD.into()),
    ..BundlerOptions::default()
  };
  let fs: Arc<dyn FileSystem> = Arc::<MemoryFileSystem>::clone(fs);
  Bundler::with_file_system(options, fs).unwrap()
}

pub async fn build(files: &[(&str, &str)], input: &[&str]) -> BundleOutput {
  let fs = file_system(files);
  bundler(&fs, input).build().await.unwrap()
}

pub fn filenames(output: &BundleOutput) -> Vec<&str> {
  output.assets.iter().map(|asset| asset.filename.as_str()).collect()
}

/// The generated text of the only output under the deps directory.
pub fn dependency_text(output: &BundleOutput) -> &str {
  let deps = output
    .assets
    .iter()
    .filter(|asset| asset.filename.starts_with("deps/"))
    .collect::<Vec<_>>();
  assert_eq!(deps.len(), 1, "{:?}", filenames(output));
  deps[0].text()
}
