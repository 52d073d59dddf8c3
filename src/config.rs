//! Analysis configuration.

use std::path::Path;

use smol_str::SmolStr;

/// Library every document imports implicitly.
pub const DEFAULT_BUILTIN_LIBRARY: &str = "BuiltIn";

/// Options that shape resolution for a whole project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Name of the implicitly imported library, looked up through the host
    /// bridge for every Settings section. `None` disables the implicit import.
    pub builtin_library: Option<SmolStr>,
    /// File extensions (without the dot) loaded as documents.
    pub document_extensions: Vec<SmolStr>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            builtin_library: Some(SmolStr::new_static(DEFAULT_BUILTIN_LIBRARY)),
            document_extensions: vec![
                SmolStr::new_static("robot"),
                SmolStr::new_static("resource"),
            ],
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different implicitly imported library.
    pub fn with_builtin_library(mut self, name: impl Into<SmolStr>) -> Self {
        self.builtin_library = Some(name.into());
        self
    }

    /// Turn the implicit library import off.
    pub fn without_builtin_library(mut self) -> Self {
        self.builtin_library = None;
        self
    }

    /// Whether a path has one of the document extensions.
    pub fn is_document_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.document_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.builtin_library.as_deref(), Some("BuiltIn"));
        assert!(config.is_document_path(Path::new("suite/login.robot")));
        assert!(config.is_document_path(Path::new("common.RESOURCE")));
        assert!(!config.is_document_path(Path::new("lib/Helpers.py")));
        assert!(!config.is_document_path(Path::new("README")));
    }

    #[test]
    fn test_builtin_overrides() {
        assert_eq!(AnalysisConfig::new().without_builtin_library().builtin_library, None);
        assert_eq!(
            AnalysisConfig::new()
                .with_builtin_library("Core")
                .builtin_library
                .as_deref(),
            Some("Core")
        );
    }
}
