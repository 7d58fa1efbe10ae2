//! Artifact serialization
//!
//! The fitted pipeline is one opaque bincode blob addressed by a versioned
//! path. The sibling metadata path is derivable from the artifact path by
//! swapping the extension, and vice versa, so neither file needs to record
//! the other's location.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::train::pipeline::SkillModelPipeline;

/// Canonical artifact path for a version: `future_skills_model_<version>.bin`.
pub fn artifact_path(output_dir: &Path, version: &str) -> PathBuf {
    output_dir.join(format!("future_skills_model_{version}.bin"))
}

/// Metadata path for an artifact: same path with a `json` extension.
pub fn metadata_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("json")
}

/// Serialize the fitted pipeline to `path`, creating parent directories.
pub fn save_pipeline(pipeline: &SkillModelPipeline, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let bytes = bincode::serialize(pipeline)
        .map_err(|e| Error::Serialization(format!("artifact encode failed: {e}")))?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Load a previously serialized pipeline.
pub fn load_pipeline(path: &Path) -> Result<SkillModelPipeline> {
    if !path.exists() {
        return Err(Error::ArtifactNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    bincode::deserialize(&bytes)
        .map_err(|e| Error::Serialization(format!("artifact decode failed: {e}")))
}
