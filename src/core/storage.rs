use crate::core::artifact::{ARTIFACT_EXTENSION, Artifact};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs as std_fs;
use std::path::{Path, PathBuf};
use tracing::info;

use tokio::fs;

#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: std::time::SystemTime,
}

impl FileEntry {
    pub fn size_label(&self) -> String {
        let size_kb = self.size / 1024;
        if size_kb < 1024 {
            format!("{size_kb}KB")
        } else {
            format!("{:.1}MB", size_kb as f64 / 1024.0)
        }
    }
}

/// Downloaded mind maps, kept in one output directory.
#[derive(Debug, Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_path(&self, file_name: &str) -> Result<PathBuf> {
        let is_plain_name = Path::new(file_name)
            .file_name()
            .is_some_and(|name| name == file_name);
        if !is_plain_name || !file_name.ends_with(&format!(".{ARTIFACT_EXTENSION}")) {
            return Err(Error::custom(format!(
                "Refusing to write artifact with unexpected name: {file_name}"
            )));
        }
        Ok(self.root.join(file_name))
    }

    /// Write the artifact into the output directory, replacing any earlier
    /// download of the same name.
    pub async fn save_artifact(&self, artifact: &Artifact) -> Result<PathBuf> {
        ensure_directory(&self.root)?;
        let path = self.artifact_path(&artifact.file_name)?;

        fs::write(&path, artifact.html.as_bytes()).await?;
        info!(path = %path.display(), bytes = artifact.html.len(), "mind map saved");

        Ok(path)
    }

    pub fn list_files(&self) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();

        let entries = match std_fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
            {
                let metadata = entry.metadata()?;
                if !metadata.is_file() {
                    continue;
                }
                files.push(FileEntry {
                    path: path.clone(),
                    name: name.to_string(),
                    size: metadata.len(),
                    modified: metadata.modified()?,
                });
            }
        }

        // Newest first
        files.sort_by(|a, b| b.modified.cmp(&a.modified));

        Ok(files)
    }

    pub fn read_file(&self, path: &Path) -> Result<String> {
        self.ensure_managed_path(path)?;
        Ok(std_fs::read_to_string(path)?)
    }

    pub fn delete_file(&self, path: &Path) -> Result<()> {
        self.ensure_managed_path(path)?;
        std_fs::remove_file(path)?;
        info!(path = %path.display(), "mind map deleted");
        Ok(())
    }

    fn ensure_managed_path(&self, path: &Path) -> Result<()> {
        let canonical = path
            .canonicalize()
            .map_err(|_| Error::custom("Target file does not exist or cannot be resolved"))?;

        let allowed = self
            .root
            .canonicalize()
            .map(|base| canonical.starts_with(base))
            .unwrap_or(false);

        if !allowed {
            return Err(Error::custom(
                "Refusing to operate on files outside the mind map output directory",
            ));
        }

        Ok(())
    }
}

/// Creates the output directory owner-only. A directory that already exists
/// keeps its permissions.
fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std_fs::create_dir_all(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std_fs::metadata(path)?;
        let mut permissions = metadata.permissions();
        if permissions.mode() & 0o777 != 0o700 {
            permissions.set_mode(0o700);
            std_fs::set_permissions(path, permissions)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_and_lists_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path().join("mindmaps"));
        assert!(storage.list_files().unwrap().is_empty());

        let artifact = Artifact::new("Test Topic", "# Test Topic\n- A");
        let path = storage.save_artifact(&artifact).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "test_topic.html");
        assert_eq!(std_fs::read_to_string(&path).unwrap(), artifact.html);

        let files = storage.list_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "test_topic.html");
        assert_eq!(files[0].size, artifact.html.len() as u64);
    }

    #[tokio::test]
    async fn saving_twice_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        storage
            .save_artifact(&Artifact::new("Topic", "# old"))
            .await
            .unwrap();
        let path = storage
            .save_artifact(&Artifact::new("Topic", "# new"))
            .await
            .unwrap();

        assert_eq!(storage.list_files().unwrap().len(), 1);
        assert!(storage.read_file(&path).unwrap().contains("# new"));
    }

    #[test]
    fn ignores_non_html_files() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std_fs::write(dir.path().join("map.html"), "<html></html>").unwrap();

        let storage = StorageService::new(dir.path());
        let names: Vec<String> = storage
            .list_files()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["map.html"]);
    }

    #[tokio::test]
    async fn rejects_names_with_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());
        let artifact = Artifact {
            file_name: "../escape.html".to_string(),
            mime: "text/html",
            html: String::new(),
        };

        assert!(storage.save_artifact(&artifact).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn creates_missing_directory_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("mindmaps");
        StorageService::new(&root)
            .save_artifact(&Artifact::new("T", "# T"))
            .await
            .unwrap();

        let mode = std_fs::metadata(&root).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn existing_directory_keeps_its_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std_fs::set_permissions(dir.path(), std_fs::Permissions::from_mode(0o755)).unwrap();

        StorageService::new(dir.path())
            .save_artifact(&Artifact::new("T", "# T"))
            .await
            .unwrap();

        let mode = std_fs::metadata(dir.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
        assert!(dir.path().join("t.html").exists());
    }

    #[test]
    fn entries_serialize_for_json_listing() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("map.html"), "<html></html>").unwrap();

        let files = StorageService::new(dir.path()).list_files().unwrap();
        let json = serde_json::to_value(&files).unwrap();

        assert_eq!(json[0]["name"], "map.html");
        assert_eq!(json[0]["size"], 13);
        assert!(json[0]["modified"].is_object());
    }

    #[test]
    fn refuses_to_delete_outside_root() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("keep.html");
        std_fs::write(&outside, "keep").unwrap();

        let storage = StorageService::new(root.path());
        assert!(storage.delete_file(&outside).is_err());
        assert!(outside.exists());

        let inside = root.path().join("gone.html");
        std_fs::write(&inside, "bye").unwrap();
        storage.delete_file(&inside).unwrap();
        assert!(!inside.exists());
    }
}
