use std::{io, path::Path, time::SystemTime};

/// Everything the bundler needs from the outside world to read sources and write outputs.
pub trait FileSystem: Send + Sync {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let bytes = self.read(path)?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
  }

  fn modified(&self, path: &Path) -> io::Result<SystemTime>;

  fn exists(&self, path: &Path) -> bool;

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  fn remove_file(&self, path: &Path) -> io::Result<()>;
}
