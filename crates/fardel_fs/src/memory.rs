use std::{
  io,
  path::{Path, PathBuf},
  sync::atomic::{AtomicU64, Ordering},
  time::{Duration, SystemTime},
};

use dashmap::DashMap;

use crate::FileSystem;

/// An in-memory file system. Modification times come from a logical clock so that every write is
/// observably newer than the previous one.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
  files: DashMap<PathBuf, (Vec<u8>, SystemTime)>,
  clock: AtomicU64,
}

impl MemoryFileSystem {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
  where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
  {
    let fs = Self::default();
    for (path, content) in files {
      fs.add_file(path.as_ref(), content.as_ref());
    }
    fs
  }

  pub fn add_file(&self, path: &Path, content: impl AsRef<[u8]>) {
    let modified = self.tick();
    self.files.insert(path.to_path_buf(), (content.as_ref().to_vec(), modified));
  }

  /// Bumps the modification time without changing the content.
  pub fn touch(&self, path: &Path) {
    let modified = self.tick();
    if let Some(mut entry) = self.files.get_mut(path) {
      entry.1 = modified;
    }
  }

  pub fn paths(&self) -> Vec<PathBuf> {
    let mut paths = self.files.iter().map(|entry| entry.key().clone()).collect::<Vec<_>>();
    paths.sort();
    paths
  }

  fn tick(&self) -> SystemTime {
    let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
    SystemTime::UNIX_EPOCH + Duration::from_millis(tick)
  }

  fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", path.display()))
  }
}

impl FileSystem for MemoryFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    self.files.get(path).map(|entry| entry.0.clone()).ok_or_else(|| Self::not_found(path))
  }

  fn modified(&self, path: &Path) -> io::Result<SystemTime> {
    self.files.get(path).map(|entry| entry.1).ok_or_else(|| Self::not_found(path))
  }

  fn exists(&self, path: &Path) -> bool {
    self.files.contains_key(path)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    self.add_file(path, content);
    Ok(())
  }

  fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
    Ok(())
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    self.files.remove(path).map(|_| ()).ok_or_else(|| Self::not_found(path))
  }
}

#[test]
fn every_write_is_newer() {
  let fs = MemoryFileSystem::with_files([("/src/a.js", "1")]);
  let first = fs.modified(Path::new("/src/a.js")).unwrap();
  fs.touch(Path::new("/src/a.js"));
  let second = fs.modified(Path::new("/src/a.js")).unwrap();
  assert!(second > first);
  assert_eq!(fs.read_to_string(Path::new("/src/a.js")).unwrap(), "1");
  assert!(fs.read(Path::new("/src/b.js")).is_err());
}
