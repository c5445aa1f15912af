use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

#[derive(Debug)]
pub struct TempFileManager {
    base_dir: TempDir,
}

#[allow(dead_code)]
impl TempFileManager {
    pub fn new() -> Self {
        Self {
            base_dir: tempfile::Builder::new()
                .prefix("kuhn-cli")
                .tempdir()
                .expect("temporary directory"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.base_dir.path().join(name)
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent directory");
        }
        fs::write(&path, content).expect("write temp file");
        path
    }
}
