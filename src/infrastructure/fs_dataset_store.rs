// Filesystem dataset store - one JSON document per dataset in a directory
use crate::application::dataset_store::DatasetStore;
use crate::domain::dataset::DatasetName;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsDatasetStore {
    root: PathBuf,
}

impl FsDatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: DatasetName) -> PathBuf {
        self.root.join(name.file_name())
    }
}

impl DatasetStore for FsDatasetStore {
    fn read_document(&self, name: DatasetName) -> std::io::Result<String> {
        let path = self.path_for(name);
        tracing::debug!("Reading dataset {} from {}", name, path.display());
        std::fs::read_to_string(path)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
