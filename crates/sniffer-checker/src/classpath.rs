//! Sources of class files: directories, jar/zip archives and single `.class` files.

use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::CheckError;
use crate::parallel::ClassUnit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassPathEntry {
    /// Walked recursively; `.class` files and nested archives in file-name order.
    Directory(PathBuf),
    /// `.jar` or `.zip`; `.class` entries in archive order.
    Archive(PathBuf),
    ClassFile(PathBuf),
}

impl ClassPathEntry {
    /// Classify `path`. Files that are neither class files nor archives yield `None`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Option<Self>, CheckError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|source| io_error(path, source))?;
        if metadata.is_dir() {
            return Ok(Some(ClassPathEntry::Directory(path.to_path_buf())));
        }
        if is_class_file(path) {
            return Ok(Some(ClassPathEntry::ClassFile(path.to_path_buf())));
        }
        if is_archive(path) {
            return Ok(Some(ClassPathEntry::Archive(path.to_path_buf())));
        }
        tracing::debug!(path = %path.display(), "ignoring file that is not a class or archive");
        Ok(None)
    }

    pub fn path(&self) -> &Path {
        match self {
            ClassPathEntry::Directory(path)
            | ClassPathEntry::Archive(path)
            | ClassPathEntry::ClassFile(path) => path,
        }
    }

    /// Hand every class in this entry to `visitor`, stopping at the first error.
    pub fn for_each_class<F>(&self, mut visitor: F) -> Result<(), CheckError>
    where
        F: FnMut(ClassUnit) -> Result<(), CheckError>,
    {
        match self {
            ClassPathEntry::Directory(dir) => visit_dir(dir, &mut visitor),
            ClassPathEntry::Archive(path) => visit_archive(path, &mut visitor),
            ClassPathEntry::ClassFile(path) => visit_class_file(path, &mut visitor),
        }
    }
}

/// Read every class reachable from `paths`, in order.
pub fn collect_classes<I, P>(paths: I) -> Result<Vec<ClassUnit>, CheckError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut out = Vec::new();
    for path in paths {
        if let Some(entry) = ClassPathEntry::from_path(path)? {
            entry.for_each_class(|unit| {
                out.push(unit);
                Ok(())
            })?;
        }
    }
    Ok(out)
}

fn visit_dir<F>(dir: &Path, visitor: &mut F) -> Result<(), CheckError>
where
    F: FnMut(ClassUnit) -> Result<(), CheckError>,
{
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            io_error(&path, err.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if is_class_file(path) {
            visit_class_file(path, visitor)?;
        } else if is_archive(path) {
            visit_archive(path, visitor)?;
        }
    }
    Ok(())
}

fn visit_class_file<F>(path: &Path, visitor: &mut F) -> Result<(), CheckError>
where
    F: FnMut(ClassUnit) -> Result<(), CheckError>,
{
    if is_ignored_class_path(path) {
        return Ok(());
    }
    let bytes = std::fs::read(path).map_err(|source| io_error(path, source))?;
    visitor(ClassUnit::new(path.display().to_string(), bytes))
}

fn visit_archive<F>(path: &Path, visitor: &mut F) -> Result<(), CheckError>
where
    F: FnMut(ClassUnit) -> Result<(), CheckError>,
{
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| zip_error(path, source))?;
    tracing::debug!(path = %path.display(), entries = archive.len(), "reading archive");

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| zip_error(path, source))?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_owned();
        if !name.ends_with(".class") || is_ignored_class_entry(&name) {
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| io_error(path, source))?;
        visitor(ClassUnit::new(format!("{}!/{}", path.display(), name), bytes))?;
    }
    Ok(())
}

fn is_class_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("class"))
}

fn is_archive(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("jar" | "zip")
    )
}

fn is_ignored_class_path(path: &Path) -> bool {
    matches!(
        path.file_stem().and_then(OsStr::to_str),
        Some("module-info" | "package-info")
    )
}

fn is_ignored_class_entry(name: &str) -> bool {
    let stem = name.rsplit('/').next().unwrap_or(name);
    stem == "module-info.class" || stem == "package-info.class"
}

fn io_error(path: &Path, source: std::io::Error) -> CheckError {
    CheckError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn zip_error(path: &Path, source: zip::result::ZipError) -> CheckError {
    CheckError::Zip {
        path: path.to_path_buf(),
        source,
    }
}
