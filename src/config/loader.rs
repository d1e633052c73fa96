//! Discover and load model and model-endpoint files from the project directory.

use crate::config::types::{ModelDefinitionConfig, ModelEndpointConfig};
use crate::config::ModelDefinition;
use crate::error::ConfigError;
use crate::settings::ArtifactOptions;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered file together with the name it is reported under in errors (relative to the project root).
#[derive(Clone, Debug)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub display: String,
    /// File name with the matched extension removed.
    pub stem: String,
}

/// List files under `options.dirs` ending in one of `options.extensions`. Missing directories yield nothing.
pub fn discover_files(project_root: &Path, options: &ArtifactOptions) -> Result<Vec<DiscoveredFile>, ConfigError> {
    let mut found = Vec::new();
    for dir in &options.dirs {
        let base = project_root.join(dir);
        if !base.is_dir() {
            tracing::debug!(dir = %base.display(), "artifact directory missing, skipping");
            continue;
        }
        let max_depth = if options.nested { usize::MAX } else { 1 };
        for entry in WalkDir::new(&base).min_depth(1).max_depth(max_depth) {
            let entry = entry.map_err(|e| ConfigError::load(base.display(), e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            let Some(ext) = options.extensions.iter().find(|ext| file_name.ends_with(ext.as_str())) else {
                continue;
            };
            let stem = file_name[..file_name.len() - ext.len()].to_string();
            let display = entry
                .path()
                .strip_prefix(project_root)
                .unwrap_or(entry.path())
                .display()
                .to_string();
            found.push(DiscoveredFile {
                path: entry.path().to_path_buf(),
                display,
                stem,
            });
        }
    }
    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

async fn load_json<T>(file: &DiscoveredFile) -> Result<T, ConfigError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    tracing::debug!(file = %file.display, "load");
    let text = tokio::fs::read_to_string(&file.path)
        .await
        .map_err(|e| ConfigError::load(&file.display, e))?;
    serde_json::from_str(&text).map_err(|e| ConfigError::load(&file.display, e))
}

pub async fn load_model(file: &DiscoveredFile) -> Result<ModelDefinition, ConfigError> {
    let config: ModelDefinitionConfig = load_json(file).await?;
    ModelDefinition::from_config(config, &file.stem)
}

pub async fn load_endpoint_config(file: &DiscoveredFile) -> Result<ModelEndpointConfig, ConfigError> {
    load_json(file).await
}
