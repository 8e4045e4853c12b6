use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};

/// Picks the source files to extract from.
#[derive(Debug, Clone)]
pub struct FileSelector {
    extensions: Vec<String>,
    exclude: Vec<Pattern>,
}

impl FileSelector {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            extensions: config.extensions.clone(),
            exclude: compile_exclude_patterns(&config.exclude)?,
        })
    }

    /// Expand resources into candidate files.
    ///
    /// A file resource is kept when its extension matches; a directory is
    /// walked recursively in file-name order. Resources that do not exist are
    /// an error.
    pub fn select<P: AsRef<Path>>(&self, resources: &[P]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for resource in resources {
            let resource = resource.as_ref();
            if resource.is_file() {
                if self.can_be_extracted(resource) {
                    files.push(resource.to_path_buf());
                }
            } else if resource.is_dir() {
                for entry in WalkDir::new(resource).sort_by_file_name() {
                    let entry = entry?;
                    let path = entry.path();
                    if entry.file_type().is_file() && self.can_be_extracted(path) {
                        files.push(path.to_path_buf());
                    }
                }
            } else {
                return Err(ExtractError::MissingResource(resource.to_path_buf()));
            }
        }

        Ok(files)
    }

    pub fn can_be_extracted(&self, path: &Path) -> bool {
        let extension_matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|candidate| candidate == ext))
            .unwrap_or(false);

        extension_matches && !matches_exclude_path(path, &self.exclude)
    }
}

fn matches_exclude_path(path: &Path, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches_path(path))
}

fn compile_exclude_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    let mut compiled = Vec::new();
    for pattern in patterns {
        let matcher = Pattern::new(pattern).map_err(|source| ExtractError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        compiled.push(matcher);
    }
    Ok(compiled)
}
