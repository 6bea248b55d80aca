// dqguard-core/src/ports/reader.rs

// Ingestion contract. The core does not care whether rows come from a CSV
// file, a database cursor or a test fixture.

use std::path::Path;

use crate::domain::dataset::Dataset;
use crate::error::GuardError;

pub trait DatasetReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Dataset, GuardError>;

    fn engine_name(&self) -> &str;
}
