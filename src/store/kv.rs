// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::codec::{self, DiagramDocument, MalformedDocumentError};
use crate::model::{Diagram, Size};

const DOCUMENT_EXTENSION: &str = "json";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Malformed {
        path: PathBuf,
        source: Box<MalformedDocumentError>,
    },
    InvalidKey {
        key: String,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl StoreError {
    /// The document parsed but failed validation; the live diagram is untouched.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Malformed { path, source } => {
                write!(f, "malformed diagram document at {path:?}: {source}")
            }
            Self::InvalidKey { key } => write!(f, "invalid store key {key:?}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            Self::InvalidKey { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place, without fsync.
    #[default]
    BestEffort,

    /// Also flushes the file and the rename to stable storage where the
    /// platform allows it.
    Durable,
}

/// Key-value persistence for serialized diagram documents.
///
/// A missing key is a normal outcome (`Ok(None)`), not an error.
pub trait DiagramStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderStore {
    root: PathBuf,
    durability: WriteDurability,
}

impl FolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{DOCUMENT_EXTENSION}")))
    }
}

impl DiagramStore for FolderStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        write_atomic(&path, document.as_bytes(), self.durability)
    }
}

/// In-process store, for tests and hosts without a disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagramStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries.insert(key.to_owned(), document.to_owned());
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key.starts_with('.')
        || key
            .chars()
            .any(|ch| matches!(ch, '/' | '\\' | ':' | '\0') || ch.is_control());
    if bad {
        return Err(StoreError::InvalidKey {
            key: key.to_owned(),
        });
    }
    Ok(())
}

/// Writes `diagram` as pretty JSON to `path`.
pub fn export_to_file(
    path: &Path,
    diagram: &Diagram,
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let contents = codec::encode_pretty(diagram).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_atomic(path, contents.as_bytes(), durability)
}

/// Reads and validates a document from `path` into a new diagram.
pub fn import_from_file(path: &Path, default_node_size: Size) -> Result<Diagram, StoreError> {
    read_document(path)?
        .into_diagram(default_node_size)
        .map_err(|source| malformed(path, source))
}

/// Reads and parses `path` without rebuilding a diagram from it yet.
pub fn read_document(path: &Path) -> Result<DiagramDocument, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    codec::parse(&contents).map_err(|source| malformed(path, source))
}

pub(crate) fn malformed(path: &Path, source: MalformedDocumentError) -> StoreError {
    StoreError::Malformed {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Temp file next to `path`, then rename over it. Readers never see a torn file.
fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".nereid-mindmap.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{
        export_to_file, import_from_file, DiagramStore, FolderStore, MemoryStore, StoreError,
        WriteDurability,
    };
    use crate::model::{Diagram, Point, DEFAULT_NODE_SIZE};
    use crate::store::test_support::TempDir;

    struct FolderCtx {
        tmp: TempDir,
        store: FolderStore,
    }

    #[fixture]
    fn ctx() -> FolderCtx {
        let tmp = TempDir::new("folder-store");
        let store = FolderStore::new(tmp.path().join("maps"));
        FolderCtx { tmp, store }
    }

    #[rstest]
    fn missing_key_reads_as_none(ctx: FolderCtx) {
        assert_eq!(ctx.store.read("mind-map").expect("read"), None);
    }

    #[rstest]
    #[case(WriteDurability::BestEffort)]
    #[case(WriteDurability::Durable)]
    fn write_then_read_returns_the_document(ctx: FolderCtx, #[case] durability: WriteDurability) {
        let mut store = ctx.store.clone().with_durability(durability);
        store.write("mind-map", "{\"nodes\":[]}").expect("write");
        store.write("mind-map", "{\"nodes\":[1]}").expect("overwrite");

        assert_eq!(
            store.read("mind-map").expect("read").as_deref(),
            Some("{\"nodes\":[1]}")
        );
        let leftovers = std::fs::read_dir(store.root())
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with('.'))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[rstest]
    #[case("")]
    #[case("../escape")]
    #[case(".hidden")]
    #[case("a\\b")]
    fn bad_keys_are_rejected(ctx: FolderCtx, #[case] key: &str) {
        let mut store = ctx.store;
        assert!(matches!(store.write(key, "{}"), Err(StoreError::InvalidKey { .. })));
        assert!(matches!(MemoryStore::new().read(key), Err(StoreError::InvalidKey { .. })));
    }

    #[cfg(unix)]
    #[rstest]
    fn writes_through_symlinks_are_refused(ctx: FolderCtx) {
        let mut store = ctx.store;
        std::fs::create_dir_all(store.root()).expect("mkdir");
        let target = ctx.tmp.path().join("elsewhere.json");
        std::fs::write(&target, "{}").expect("target");
        let link = store.path_for("mind-map").expect("path");
        std::os::unix::fs::symlink(&target, &link).expect("symlink");

        assert!(matches!(
            store.write("mind-map", "{}"),
            Err(StoreError::SymlinkRefused { .. })
        ));
        assert_eq!(std::fs::read_to_string(&target).expect("target"), "{}");
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("k").expect("read"), None);
        store.write("k", "doc").expect("write");
        assert_eq!(store.read("k").expect("read").as_deref(), Some("doc"));
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    fn export_then_import_rebuilds_the_diagram(ctx: FolderCtx) {
        let mut diagram = Diagram::default();
        let a = diagram.graph_mut().create_node(Point::new(1.0, 2.0), "A", true);
        let b = diagram.graph_mut().create_node(Point::new(3.0, 4.0), "B", false);
        diagram.graph_mut().create_connection(&a, &b, None).expect("link");

        let path = ctx.tmp.path().join("export").join("map.json");
        export_to_file(&path, &diagram, WriteDurability::BestEffort).expect("export");
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.ends_with('\n'));

        let imported = import_from_file(&path, DEFAULT_NODE_SIZE).expect("import");
        assert!(imported.content_eq(&diagram));
    }

    #[rstest]
    fn malformed_import_is_reported(ctx: FolderCtx) {
        let path = ctx.tmp.path().join("broken.json");
        std::fs::write(&path, "{\"nodes\": 3}").expect("write");

        let err = import_from_file(&path, DEFAULT_NODE_SIZE).expect_err("malformed");
        assert!(err.is_malformed());
        assert!(matches!(
            import_from_file(&ctx.tmp.path().join("nope.json"), DEFAULT_NODE_SIZE),
            Err(StoreError::Io { .. })
        ));
    }
}
