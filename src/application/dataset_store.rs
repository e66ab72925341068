// Store trait for raw dataset documents
use crate::domain::dataset::DatasetName;

pub trait DatasetStore: Send + Sync {
    /// Read the raw text of the named document
    fn read_document(&self, name: DatasetName) -> std::io::Result<String>;

    /// Where documents come from, for logs
    fn describe(&self) -> String;
}
