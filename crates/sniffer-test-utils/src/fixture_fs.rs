use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary class-output directory (`target/classes` style).
pub struct ClassDirFixture {
    dir: TempDir,
}

impl ClassDirFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to `<root>/<internal_name>.class`, creating package dirs.
    pub fn add_class(&self, internal_name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(format!("{internal_name}.class"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create package dirs");
        }
        std::fs::write(&path, bytes).expect("write class file");
        path
    }

    /// Write an arbitrary file relative to the root.
    pub fn add_file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, bytes).expect("write file");
        path
    }
}

impl Default for ClassDirFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a jar at `path` containing `entries` (`(entry_name, bytes)`), in order.
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create jar");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(name.trim_end_matches('/'), options)
                .expect("add jar directory");
            continue;
        }
        zip.start_file(*name, options).expect("start jar entry");
        zip.write_all(bytes).expect("write jar entry");
    }
    zip.finish().expect("finish jar");
}
