//! Runtime settings store
//!
//! The serving side reads the active model version and artifact path from a
//! small typed JSON document. The orchestrator updates it through a typed
//! setter after a successful retrain; there is no text substitution
//! involved, so a malformed write cannot corrupt unrelated settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Keys of the runtime settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pub model_version: String,
    pub model_path: PathBuf,
}

impl RuntimeSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Serialization(format!("settings decode failed: {e}")))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("settings encode failed: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Point the serving side at a newly trained artifact.
    pub fn set_active_model(&mut self, version: &str, artifact: &Path) {
        self.model_version = version.to_string();
        self.model_path = artifact.to_path_buf();
    }
}

/// Load-or-default, set the active model, and write back.
pub fn update_runtime_settings(path: &Path, version: &str, artifact: &Path) -> Result<()> {
    let mut settings = if path.exists() {
        RuntimeSettings::load(path)?
    } else {
        RuntimeSettings::default()
    };
    settings.set_active_model(version, artifact);
    settings.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_update_creates_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime_settings.json");

        update_runtime_settings(&path, "v4", Path::new("models/future_skills_model_v4.bin"))
            .unwrap();

        let settings = RuntimeSettings::load(&path).unwrap();
        assert_eq!(settings.model_version, "v4");
        assert_eq!(
            settings.model_path,
            PathBuf::from("models/future_skills_model_v4.bin")
        );
    }

    #[test]
    fn test_update_replaces_only_model_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime_settings.json");

        update_runtime_settings(&path, "v1", Path::new("a.bin")).unwrap();
        update_runtime_settings(&path, "v2", Path::new("b.bin")).unwrap();

        let settings = RuntimeSettings::load(&path).unwrap();
        assert_eq!(settings.model_version, "v2");
        assert_eq!(settings.model_path, PathBuf::from("b.bin"));
    }

    #[test]
    fn test_malformed_settings_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime_settings.json");
        fs::write(&path, "MODEL_VERSION = 'v1'").unwrap();

        let err = update_runtime_settings(&path, "v2", Path::new("b.bin")).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
