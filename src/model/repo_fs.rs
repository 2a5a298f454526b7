//! Filesystem access for serialised model artifacts.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::ModelLoadError;

use super::domain::ModelSource;

/// Reads artifacts from disk, relative paths resolved against `root`.
pub struct FsModelRepo {
    root: PathBuf,
}

impl FsModelRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Raw artifact bytes for `source`.
    pub fn read<'a>(&self, source: &'a ModelSource) -> Result<Cow<'a, [u8]>, ModelLoadError> {
        match source {
            ModelSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            ModelSource::Path(path) => {
                let path = self.resolve(path);
                fs::read(&path)
                    .map(Cow::Owned)
                    .map_err(|source| ModelLoadError::Io { path, source })
            }
        }
    }
}

impl Default for FsModelRepo {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_relative_to_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut file = fs::File::create(dir.path().join("model.json")).expect("create");
        file.write_all(b"{}").expect("write");

        let repo = FsModelRepo::new(dir.path());
        let source = ModelSource::Path(PathBuf::from("model.json"));
        let bytes = repo.read(&source).unwrap();
        assert_eq!(&*bytes, b"{}");
    }

    #[test]
    fn in_memory_source_is_borrowed() {
        let source = ModelSource::Bytes(b"{\"name\":1}".to_vec());
        let bytes = FsModelRepo::default().read(&source).unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
    }

    #[test]
    fn relative_paths_without_root_stay_relative() {
        assert_eq!(
            FsModelRepo::default().resolve(Path::new("models/rf.json")),
            PathBuf::from("models/rf.json")
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let repo = FsModelRepo::new("/nonexistent");
        match repo.read(&ModelSource::Path(PathBuf::from("gbr.json"))) {
            Err(ModelLoadError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/gbr.json"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
