//! Migration configuration
//!
//! Every field has a default, so an empty TOML file (or none at all) yields
//! the conventions of the legacy exports.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A title whose short description is always the same sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypicalShortDescription {
    /// Topic title, matched exactly
    pub title: String,
    /// Short description to set when missing
    pub short_description: String,
    /// Also place a spacer paragraph after the topic's first table
    #[serde(default)]
    pub spacer_after_table: bool,
}

impl TypicalShortDescription {
    fn new(title: &str, short_description: &str, spacer_after_table: bool) -> Self {
        Self {
            title: title.to_string(),
            short_description: short_description.to_string(),
            spacer_after_table,
        }
    }
}

/// Configuration for discovery and renaming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Extension of topic files, without the dot
    pub topic_extension: String,
    /// Image extensions, matched case-insensitively
    pub image_extensions: Vec<String>,
    /// Image folder of media-flavor projects, relative to the project folder
    pub media_folder: String,
    /// Extension of sidecar metadata files
    pub sidecar_extension: String,
    /// Status file name prefix; the map stem and `.txt` follow
    pub status_prefix: String,
    /// Title → short description table
    pub typical_short_descriptions: Vec<TypicalShortDescription>,
}

impl MigrationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file; absent keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// With image extensions
    #[inline]
    #[must_use]
    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// With media folder name
    #[inline]
    #[must_use]
    pub fn with_media_folder(mut self, folder: impl Into<String>) -> Self {
        self.media_folder = folder.into();
        self
    }

    /// With status file prefix
    #[inline]
    #[must_use]
    pub fn with_status_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.status_prefix = prefix.into();
        self
    }

    /// With one more typical short description
    #[must_use]
    pub fn with_typical_short_description(
        mut self,
        title: &str,
        short_description: &str,
        spacer_after_table: bool,
    ) -> Self {
        self.typical_short_descriptions
            .push(TypicalShortDescription::new(title, short_description, spacer_after_table));
        self
    }

    /// True when the file has the topic extension
    #[must_use]
    pub fn is_topic(&self, path: &Path) -> bool {
        has_extension(path, &self.topic_extension)
    }

    /// True when the file has one of the image extensions
    #[must_use]
    pub fn is_image(&self, path: &Path) -> bool {
        self.image_extensions.iter().any(|ext| has_extension(path, ext))
    }

    /// True when the file has the sidecar extension
    #[must_use]
    pub fn is_sidecar(&self, path: &Path) -> bool {
        has_extension(path, &self.sidecar_extension)
    }

    /// Sidecar path belonging to a topic path
    #[must_use]
    pub fn sidecar_path(&self, topic: &Path) -> PathBuf {
        topic.with_extension(&self.sidecar_extension)
    }

    /// Short description configured for a title
    #[must_use]
    pub fn typical_short_description(&self, title: &str) -> Option<&TypicalShortDescription> {
        self.typical_short_descriptions.iter().find(|entry| entry.title == title)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            topic_extension: "dita".to_string(),
            image_extensions: vec!["png".to_string(), "jpg".to_string(), "gif".to_string()],
            media_folder: "media".to_string(),
            sidecar_extension: "3sish".to_string(),
            status_prefix: "status_".to_string(),
            typical_short_descriptions: vec![
                TypicalShortDescription::new(
                    "Revision history and confidentiality notice",
                    "This chapter contains a table of revisions, printing instructions, and a notice of document confidentiality.",
                    false,
                ),
                TypicalShortDescription::new(
                    "Revision history",
                    "Below is the history of the document revisions and a list of authors.",
                    false,
                ),
                TypicalShortDescription::new(
                    "Printing instructions",
                    "Follow these recommendations to achieve the best print quality.",
                    true,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        let config = MigrationConfig::new();
        assert!(config.is_image(Path::new("media/FIG1.PNG")));
        assert!(config.is_image(Path::new("a.Jpg")));
        assert!(!config.is_image(Path::new("a.svg")));
        assert!(config.is_topic(Path::new("t.dita")));
        assert!(config.is_sidecar(Path::new("t.3SISH")));
    }

    #[test]
    fn builder_overrides() {
        let config = MigrationConfig::new()
            .with_image_extensions(["svg"])
            .with_media_folder("images")
            .with_typical_short_description("Glossary", "Terms used in this document.", false);
        assert!(config.is_image(Path::new("x.svg")));
        assert_eq!(config.media_folder, "images");
        assert_eq!(
            config.typical_short_description("Glossary").map(|t| t.short_description.as_str()),
            Some("Terms used in this document.")
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrate.toml");
        std::fs::write(
            &path,
            "media_folder = \"img\"\n\n[[typical_short_descriptions]]\ntitle = \"Index\"\nshort_description = \"Alphabetical index.\"\n",
        )
        .unwrap();

        let config = MigrationConfig::load(&path).unwrap();
        assert_eq!(config.media_folder, "img");
        assert_eq!(config.topic_extension, "dita");
        assert_eq!(config.typical_short_descriptions.len(), 1);
        assert!(!config.typical_short_descriptions[0].spacer_after_table);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "media_folder = [").unwrap();
        assert!(matches!(MigrationConfig::load(&path), Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn sidecar_path_replaces_extension() {
        let config = MigrationConfig::new();
        assert_eq!(config.sidecar_path(Path::new("p/t_a.dita")), PathBuf::from("p/t_a.3sish"));
    }
}
