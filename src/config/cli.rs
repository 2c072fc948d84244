use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Reads inputs from the given path and writes reports under `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(path)?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("reports");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        let written = storage.write_file("weekly_analysis.svg", b"<svg/>").unwrap();

        assert!(written.ends_with("weekly_analysis.svg"));
        assert_eq!(fs::read(base.join("weekly_analysis.svg")).unwrap(), b"<svg/>");
    }

    #[test]
    fn test_read_uses_path_as_given() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("data.json");
        fs::write(&input, "{}").unwrap();

        let storage = LocalStorage::new("unused-output".to_string());
        assert_eq!(storage.read_file(input.to_str().unwrap()).unwrap(), b"{}");
        assert!(storage.read_file("does/not/exist.json").is_err());
    }
}
