//! Process-wide dataset slot.
//!
//! The dashboard loads its dataset once at startup and every query reads
//! from the same immutable instance afterwards. [`Dataset`] is `Sync`, so
//! the slot can be read from any thread without locking.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::progress::ProgressCallback;
use crate::schema::DatasetSchema;
use crate::{Dataset, LoadError, load_with_schema};

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Loads the dataset at `path` into the process-wide slot.
///
/// # Errors
///
/// Returns [`LoadError::AlreadyLoaded`] if a dataset was already installed,
/// or any error from [`load_with_schema`].
pub fn init(
    path: &Path,
    schema: &DatasetSchema,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<&'static Dataset, LoadError> {
    if DATASET.get().is_some() {
        return Err(LoadError::AlreadyLoaded);
    }
    install(load_with_schema(path, schema, progress)?)
}

/// Installs an already-loaded dataset into the process-wide slot.
///
/// # Errors
///
/// Returns [`LoadError::AlreadyLoaded`] if a dataset was already installed.
pub fn install(dataset: Dataset) -> Result<&'static Dataset, LoadError> {
    DATASET.set(dataset).map_err(|_| LoadError::AlreadyLoaded)?;
    DATASET.get().ok_or(LoadError::AlreadyLoaded)
}

/// Returns the process-wide dataset, if one has been loaded.
#[must_use]
pub fn get() -> Option<&'static Dataset> {
    DATASET.get()
}
