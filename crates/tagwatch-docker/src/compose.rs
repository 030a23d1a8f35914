//! Compose file discovery
//!
//! Walks a directory tree for compose files and records the image each
//! service declares. Discovery is informational: unreadable files and a
//! missing base directory become warnings, never errors.

use crate::error::{EngineError, Result};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File names recognized as compose files
pub const COMPOSE_FILE_NAMES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// A compose file and the images its services declare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeFile {
    pub path: PathBuf,
    /// Service name to image reference
    pub services: BTreeMap<String, String>,
}

impl ComposeFile {
    /// `parent/file` label, e.g. `media/compose.yaml`
    pub fn label(&self) -> String {
        let file = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self
            .path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy())
        {
            Some(parent) => format!("{}/{}", parent, file),
            None => file,
        }
    }
}

/// Everything found under the compose base directory
#[derive(Debug, Clone, Default)]
pub struct ComposeInventory {
    pub base_dir: PathBuf,
    /// Files declaring at least one service image, sorted by path
    pub files: Vec<ComposeFile>,
    /// Compose files found in total, including ones without images
    pub files_found: usize,
    pub warnings: Vec<String>,
}

impl ComposeInventory {
    pub fn service_count(&self) -> usize {
        self.files.iter().map(|f| f.services.len()).sum()
    }
}

/// Find and parse every compose file under `base_dir`
pub fn discover_compose_files(base_dir: impl AsRef<Path>) -> ComposeInventory {
    let base_dir = base_dir.as_ref();
    let mut inventory = ComposeInventory {
        base_dir: base_dir.to_path_buf(),
        ..Default::default()
    };

    if !base_dir.is_dir() {
        let message = format!("Directory {} does not exist", base_dir.display());
        warn!("{}", message);
        inventory.warnings.push(message);
        return inventory;
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(base_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| COMPOSE_FILE_NAMES.contains(&name))
        })
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    inventory.files_found = paths.len();
    debug!("Found {} compose file(s) in {}", paths.len(), base_dir.display());

    for path in paths {
        match parse_compose_file(&path) {
            Ok(services) if services.is_empty() => {}
            Ok(services) => inventory.files.push(ComposeFile { path, services }),
            Err(e) => {
                let message = e.to_string();
                warn!("{}", message);
                inventory.warnings.push(message);
            }
        }
    }

    inventory
}

/// Service images declared in one compose file
pub fn parse_compose_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::ComposeRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_compose_str(&content).map_err(|source| EngineError::ComposeParse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_compose_str(
    content: &str,
) -> std::result::Result<BTreeMap<String, String>, serde_yaml_ng::Error> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let doc: Value = serde_yaml_ng::from_str(content)?;

    let Some(services) = doc.get("services").and_then(Value::as_mapping) else {
        return Ok(BTreeMap::new());
    };

    Ok(services
        .iter()
        .filter_map(|(name, service)| {
            let name = name.as_str()?;
            let image = service.get("image")?.as_str()?;
            Some((name.to_string(), image.to_string()))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MEDIA_COMPOSE: &str = r#"
services:
  sonarr:
    image: linuxserver/sonarr:latest
  radarr:
    image: ghcr.io/linuxserver/radarr:develop
  builder:
    build: .
"#;

    #[test]
    fn test_parse_compose_str() {
        let services = parse_compose_str(MEDIA_COMPOSE).unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services["sonarr"], "linuxserver/sonarr:latest");
        assert!(!services.contains_key("builder"));
    }

    #[test]
    fn test_parse_compose_without_services() {
        assert!(parse_compose_str("").unwrap().is_empty());
        assert!(parse_compose_str("version: '3'\n").unwrap().is_empty());
        assert!(parse_compose_str("services: [: bad").is_err());
    }

    #[test]
    fn test_discover_nested_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("media")).unwrap();
        fs::create_dir_all(temp.path().join("infra/dns")).unwrap();
        fs::write(temp.path().join("media/compose.yaml"), MEDIA_COMPOSE).unwrap();
        fs::write(
            temp.path().join("infra/dns/docker-compose.yml"),
            "services:\n  pihole:\n    image: pihole/pihole\n",
        )
        .unwrap();
        fs::write(temp.path().join("media/notes.yaml"), "services: {}").unwrap();

        let inventory = discover_compose_files(temp.path());
        assert_eq!(inventory.files_found, 2);
        assert_eq!(inventory.files.len(), 2);
        assert_eq!(inventory.service_count(), 3);
        assert!(inventory.warnings.is_empty());

        assert_eq!(inventory.files[0].label(), "dns/docker-compose.yml");
        assert_eq!(inventory.files[1].label(), "media/compose.yaml");
        assert_eq!(inventory.files[0].services["pihole"], "pihole/pihole");
    }

    #[test]
    fn test_unparseable_file_is_a_warning() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("compose.yml"), "services: [: bad").unwrap();

        let inventory = discover_compose_files(temp.path());
        assert_eq!(inventory.files_found, 1);
        assert!(inventory.files.is_empty());
        assert_eq!(inventory.warnings.len(), 1);
        assert!(inventory.warnings[0].contains("Could not parse"));
    }

    #[test]
    fn test_parse_compose_file_errors_name_the_file() {
        let temp = TempDir::new().unwrap();
        let bad = temp.path().join("compose.yaml");
        fs::write(&bad, "services: [: bad").unwrap();

        let err = parse_compose_file(&bad).unwrap_err();
        assert!(matches!(&err, EngineError::ComposeParse { path, .. } if path == &bad));
        assert!(err.to_string().starts_with("Could not parse"));

        let missing = temp.path().join("docker-compose.yml");
        let err = parse_compose_file(&missing).unwrap_err();
        assert!(matches!(&err, EngineError::ComposeRead { path, .. } if path == &missing));
    }

    #[test]
    fn test_missing_directory() {
        let inventory = discover_compose_files("/nonexistent/tagwatch/stacks");
        assert!(inventory.files.is_empty());
        assert_eq!(inventory.warnings.len(), 1);
        assert!(inventory.warnings[0].contains("does not exist"));
    }
}
