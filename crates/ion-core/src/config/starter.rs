//! Starter configuration file generation

use crate::error::StarterError;
use crate::product::ProductConfig;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Bundled starter template
const STARTER_TEMPLATE: &str = include_str!("../../templates/starter.config.ts");

/// Project name used when none is given
pub const DEFAULT_PROJECT_NAME: &str = "myapp";

/// Render the starter template for a project name.
///
/// The name is emitted as a quoted, escaped string literal.
pub fn render_starter<C: ProductConfig>(config: &C, name: &str) -> String {
    let literal = serde_json::Value::String(name.to_string()).to_string();
    STARTER_TEMPLATE
        .replace("{{workspace}}", config.workspace_dir_name())
        .replace("{{name}}", &literal)
}

/// Write a starter configuration file into `dir`.
///
/// Never overwrites: an existing entry point is reported as
/// [`StarterError::AlreadyExists`]. Returns the path of the new file.
pub async fn create_starter<C: ProductConfig>(
    config: &C,
    dir: &Path,
    name: &str,
) -> Result<PathBuf, StarterError> {
    let path = dir.join(config.config_file_name());
    let io_err = |source| StarterError::Io {
        path: path.clone(),
        source,
    };

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(StarterError::AlreadyExists(path.clone()));
        }
        Err(e) => return Err(io_err(e)),
    };

    file.write_all(render_starter(config, name).as_bytes())
        .await
        .map_err(io_err)?;
    file.flush().await.map_err(io_err)?;

    tracing::info!("wrote starter configuration to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::test_support::TestProduct;
    use tempfile::TempDir;

    #[test]
    fn test_render_substitutes_placeholders() {
        let rendered = render_starter(&TestProduct, "shop");

        assert!(rendered.contains(r#"name: "shop""#));
        assert!(rendered.contains(r#"region: "us-east-1""#));
        assert!(rendered.contains("./.ion/src/global.d.ts"));
        assert!(rendered.contains("async run()"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_render_escapes_name() {
        let name = "a\"b\\c\nd";
        let rendered = render_starter(&TestProduct, name);

        let line = rendered
            .lines()
            .find_map(|l| l.trim().strip_prefix("name: "))
            .unwrap();
        let literal = line.strip_suffix(',').unwrap();
        let parsed: String = serde_json::from_str(literal).unwrap();
        assert_eq!(parsed, name);
        assert!(rendered.contains(r#"region: "us-east-1","#));
    }

    #[tokio::test]
    async fn test_create_writes_file() {
        let temp = TempDir::new().unwrap();

        let path = create_starter(&TestProduct, temp.path(), DEFAULT_PROJECT_NAME)
            .await
            .unwrap();

        assert_eq!(path, temp.path().join("ion.config.ts"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, render_starter(&TestProduct, "myapp"));
    }

    #[tokio::test]
    async fn test_create_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let existing = temp.path().join("ion.config.ts");
        std::fs::write(&existing, "// mine").unwrap();

        let err = create_starter(&TestProduct, temp.path(), "myapp")
            .await
            .unwrap_err();

        assert!(matches!(err, StarterError::AlreadyExists(ref p) if *p == existing));
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "// mine");
    }

    #[tokio::test]
    async fn test_create_in_missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = create_starter(&TestProduct, &missing, "myapp")
            .await
            .unwrap_err();
        assert!(matches!(err, StarterError::Io { .. }));
    }
}
