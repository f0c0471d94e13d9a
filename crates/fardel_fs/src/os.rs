use std::{fs, io, path::Path, time::SystemTime};

use crate::FileSystem;

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
  }

  fn modified(&self, path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    fs::write(path, content)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    fs::remove_file(path)
  }
}

#[test]
fn reads_back_written_files() {
  let dir = tempfile::tempdir().unwrap();
  let fs = OsFileSystem;
  let nested = dir.path().join("dist").join("deps");
  fs.create_dir_all(&nested).unwrap();

  let file = nested.join("a.js");
  fs.write(&file, b"export default 1;").unwrap();

  assert!(fs.exists(&file));
  assert_eq!(fs.read_to_string(&file).unwrap(), "export default 1;");
  assert!(fs.modified(&file).is_ok());

  fs.remove_file(&file).unwrap();
  assert!(!fs.exists(&file));
}
