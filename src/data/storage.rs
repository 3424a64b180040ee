use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

use super::dataset::{Dataset, DatasetFile};

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load a dataset export from disk.
///
/// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
/// Duplicate ids are rejected here; dangling references are left for
/// `Dataset::check_integrity` or the computation that trips over them.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        anyhow::bail!("Dataset file not found at {}", path.display());
    }

    let file: DatasetFile = if is_yaml(path) {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset at {}", path.display()))?;
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse dataset: invalid YAML in {}", path.display()))?
    } else {
        let reader = File::open(path)
            .with_context(|| format!("Failed to open dataset at {}", path.display()))?;
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse dataset: invalid JSON in {}", path.display()))?
    };

    tracing::debug!(
        drivers = file.drivers.len(),
        sessions = file.sessions.len(),
        laps = file.laps.len(),
        "loaded dataset from {}",
        path.display()
    );

    Dataset::new(file).with_context(|| format!("Inconsistent dataset in {}", path.display()))
}
