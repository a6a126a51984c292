use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::sizing::SizeRange;

/// Pointer attraction may never exceed this, so it stays below the centering
/// forces and far below collision.
pub const POINTER_STRENGTH_CEILING: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub initial_alpha: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub reheat_alpha: f32,
    pub drag_alpha_target: f32,
    pub velocity_decay: f32,
    pub repulsion_strength: f32,
    pub repulsion_softening: f32,
    pub barnes_hut_theta: f32,
    pub collision_strength: f32,
    pub collision_padding: f32,
    pub center_strength_x: f32,
    pub center_strength_y: f32,
    pub boundary_padding: f32,
    pub max_speed: f32,
    pub pointer_strength: f32,
    pub hover_scale: f32,
    pub neighbor_scale: f32,
    pub neighbor_reach: f32,
    pub touch_primary: bool,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            initial_alpha: 0.35,
            alpha_min: 0.001,
            alpha_decay: 0.015,
            reheat_alpha: 0.12,
            drag_alpha_target: 0.3,
            velocity_decay: 0.4,
            repulsion_strength: 12_000.0,
            repulsion_softening: 400.0,
            barnes_hut_theta: 0.72,
            collision_strength: 0.7,
            collision_padding: 4.0,
            center_strength_x: 0.04,
            center_strength_y: 0.06,
            boundary_padding: 6.0,
            max_speed: 12.0,
            pointer_strength: 0.004,
            hover_scale: 1.35,
            neighbor_scale: 1.1,
            neighbor_reach: 1.6,
            touch_primary: false,
        }
    }
}

impl ForceConfig {
    pub fn pointer_strength(&self) -> f32 {
        self.pointer_strength.clamp(0.0, POINTER_STRENGTH_CEILING)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub range: SizeRange,
    pub base_radius: f32,
    pub root_radius: f32,
    pub min_radius: f32,
    pub levels: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            range: SizeRange::default(),
            base_radius: 18.0,
            root_radius: 64.0,
            min_radius: 22.0,
            levels: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub selected_scale: f32,
    pub segment_ring_width: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            selected_scale: 1.25,
            segment_ring_width: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub debounce_ms: u64,
    pub step_px: f32,
    pub min_extent: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            step_px: 16.0,
            min_extent: 48.0,
        }
    }
}

impl ViewportConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub reduced_motion: bool,
    pub transition_ms: u64,
    pub settle_tick_budget: usize,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            transition_ms: 220,
            settle_tick_budget: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub forces: ForceConfig,
    pub sizing: SizingConfig,
    pub selection: SelectionConfig,
    pub viewport: ViewportConfig,
    pub motion: MotionConfig,
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "folio-field")?;
    Some(proj.config_dir().join("field.toml"))
}

pub fn load_or_default() -> FieldConfig {
    let Some(path) = config_file_path() else {
        return FieldConfig::default();
    };
    load_or_default_from_path(&path)
}

pub fn load_or_default_from_path(path: &Path) -> FieldConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return FieldConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|error| {
        tracing::warn!(path = %path.display(), %error, "invalid field config, using defaults");
        FieldConfig::default()
    })
}

pub fn save(cfg: &FieldConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

pub fn save_to_path(cfg: &FieldConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize field config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write field config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn field_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("field.toml");
        let mut cfg = FieldConfig::default();
        cfg.motion.reduced_motion = true;
        cfg.forces.max_speed = 9.5;

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("field.toml");
        fs::write(
            &path,
            r#"
[forces]
repulsion_strength = 5000.0

[sizing.range]
min = 0.5
max = 2.0
"#,
        )
        .expect("write config");

        let loaded = load_or_default_from_path(&path);
        assert_eq!(loaded.forces.repulsion_strength, 5000.0);
        assert_eq!(loaded.forces.max_speed, ForceConfig::default().max_speed);
        assert_eq!(loaded.sizing.range, SizeRange { min: 0.5, max: 2.0 });
        assert_eq!(loaded.viewport, ViewportConfig::default());
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("field.toml");
        fs::write(&path, "forces = 12").expect("write config");
        assert_eq!(load_or_default_from_path(&path), FieldConfig::default());
    }

    #[test]
    fn pointer_strength_is_capped() {
        let cfg = ForceConfig {
            pointer_strength: 0.5,
            ..ForceConfig::default()
        };
        assert_eq!(cfg.pointer_strength(), POINTER_STRENGTH_CEILING);
    }
}
