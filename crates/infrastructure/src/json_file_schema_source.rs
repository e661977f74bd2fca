use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quarry_application::SchemaSource;
use quarry_core::{AppError, AppResult};
use quarry_domain::Schema;
use tracing::info;

mod document;

#[cfg(test)]
mod tests;

/// Reads schema documents from a JSON file or a directory of `*.json`
/// files.
#[derive(Debug, Clone)]
pub struct JsonFileSchemaSource {
    path: PathBuf,
}

impl JsonFileSchemaSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the configured path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn document_files(&self) -> AppResult<Vec<PathBuf>> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|error| read_error(&self.path, &error))?;
        if !metadata.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let mut entries = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|error| read_error(&self.path, &error))?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|error| read_error(&self.path, &error))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|extension| extension == "json") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl SchemaSource for JsonFileSchemaSource {
    async fn load_schemas(&self) -> AppResult<Vec<Schema>> {
        let files = self.document_files().await?;

        let mut schemas = Vec::new();
        for file in &files {
            let contents = tokio::fs::read_to_string(file)
                .await
                .map_err(|error| read_error(file, &error))?;
            let parsed = document::parse_schema_document(&contents).map_err(|error| {
                AppError::Validation(format!(
                    "invalid schema document '{}': {error}",
                    file.display()
                ))
            })?;
            schemas.extend(parsed);
        }

        info!(
            path = %self.path.display(),
            documents = files.len(),
            schemas = schemas.len(),
            "schema documents loaded"
        );
        Ok(schemas)
    }
}

fn read_error(path: &Path, error: &std::io::Error) -> AppError {
    AppError::Internal(format!("failed to read '{}': {error}", path.display()))
}
