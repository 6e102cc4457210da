//! Scene scaffolding

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a sample `scene.toml` into `dir`
pub fn create_scene(dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join("scene.toml");
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    fs::write(&path, sample_scene(name))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// A landing page with one of everything
pub fn sample_scene(name: &str) -> String {
    format!(
        r#"# Assay motion scene
#
# Times are seconds from the start of the simulation. Elements without
# `visible_at` never scroll into view.

[scene]
name = {}
tick_hz = 60.0
seconds = 4.0

# Stats band: counts up once it scrolls into view
[[counter]]
id = "samples"
target = 1200
duration = 2.0
separator = ","
suffix = "+"
visible_at = 0.5

[[counter]]
id = "accuracy"
target = 98
duration = 1.5
suffix = "%"
visible_at = 0.5

# Hero heading, revealed word by word
[[stagger]]
id = "headline"
text = "Precision diagnostics for modern research"
delay = 0.08
item_duration = 0.4
visible_at = 0.0

# Feature cards
[[stagger]]
id = "features"
items = ["Speed", "Accuracy", "Scale", "Support"]
delay = 0.1
delay_children = 0.2
easing = "ease-out"
visible_at = 1.5

# Hero background glow following the pointer
[[spotlight]]
id = "glow"
stiffness = 150.0
damping = 15.0
pointer = [
    {{ at = 0.25, x = 320.0, y = 180.0 }},
    {{ at = 1.0, x = 640.0, y = 240.0 }},
    {{ at = 2.5, leave = true }},
]

[[loop]]
id = "badge-spin"
kind = "spin"
period = 8.0

[[loop]]
id = "cta-pulse"
kind = "pulse"
period = 2.0
"#,
        toml::Value::String(name.into())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_scene(dir.path(), "demo").unwrap();
        assert!(path.ends_with("scene.toml"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"name = "demo""#));

        // Refuses to overwrite
        assert!(create_scene(dir.path(), "demo").is_err());
    }

    #[test]
    fn test_scene_name_is_escaped() {
        let name = "a\"b\\c\n# d";
        let parsed: toml::Value = toml::from_str(&sample_scene(name)).unwrap();
        assert_eq!(parsed["scene"]["name"].as_str(), Some(name));
    }
}
