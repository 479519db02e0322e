//! Passthrough copy of static asset directories

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::SiteConfig;

/// Copy every configured passthrough source to its destination under the
/// output root, byte for byte. Returns the number of files copied.
pub fn copy_passthrough(config: &SiteConfig, input_dir: &Path, output_dir: &Path) -> Result<usize> {
    let mut copied = 0;

    for (source, destination) in &config.passthrough {
        let source_path = input_dir.join(source);
        let destination_path = output_dir.join(destination.trim_start_matches('/'));

        if !source_path.exists() {
            tracing::debug!("Passthrough source {:?} does not exist, skipping", source_path);
            continue;
        }

        if source_path.is_file() {
            copy_file(&source_path, &destination_path)?;
            copied += 1;
            continue;
        }

        for entry in WalkDir::new(&source_path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&source_path)?;
            copy_file(entry.path(), &destination_path.join(relative))?;
            copied += 1;
        }

        tracing::debug!("Copied {:?} -> {:?}", source_path, destination_path);
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_copies_directories_verbatim() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let js = input.path().join("public/js/vendor");
        fs::create_dir_all(&js).unwrap();
        let bytes: Vec<u8> = (0u8..=255).collect();
        fs::write(input.path().join("public/js/main.js"), "(function(){})();").unwrap();
        fs::write(js.join("blob.bin"), &bytes).unwrap();
        fs::write(input.path().join("robots.txt"), "User-agent: *").unwrap();

        let mut passthrough = IndexMap::new();
        passthrough.insert("public/js".to_string(), "js".to_string());
        passthrough.insert("public/css".to_string(), "css".to_string());
        passthrough.insert("robots.txt".to_string(), "robots.txt".to_string());
        let config = SiteConfig {
            passthrough,
            ..SiteConfig::default()
        };

        let copied = copy_passthrough(&config, input.path(), output.path()).unwrap();
        assert_eq!(copied, 3);
        assert_eq!(
            fs::read_to_string(output.path().join("js/main.js")).unwrap(),
            "(function(){})();"
        );
        assert_eq!(fs::read(output.path().join("js/vendor/blob.bin")).unwrap(), bytes);
        assert!(output.path().join("robots.txt").exists());
        assert!(!output.path().join("css").exists());
    }
}
