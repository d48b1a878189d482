use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use pm_core::MorphStep;
use serde::Serialize;

/// Numbered run directory under `<out_root>/morphs/`.
#[derive(Debug, Clone)]
pub struct RunDir {
    pub path: PathBuf,
    pub number: u32,
}

impl RunDir {
    /// Create `<out_root>/morphs/NNNNN/` using the next free number.
    pub fn create(out_root: &Path) -> anyhow::Result<Self> {
        let morphs = out_root.join("morphs");
        fs::create_dir_all(&morphs)
            .with_context(|| format!("failed to create '{}'", morphs.display()))?;

        let number = next_sequence_number(&morphs)?;
        let path = morphs.join(format!("{number:05}"));
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;

        Ok(Self { path, number })
    }

    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.path.join(format!("{frame:05}.png"))
    }

    pub fn video_path(&self) -> PathBuf {
        self.path.join(format!("morph-{:05}.webm", self.number))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("run.json")
    }
}

/// Highest numeric entry name plus one; an empty directory starts at 0.
pub fn next_sequence_number(dir: &Path) -> anyhow::Result<u32> {
    let mut highest: Option<u32> = None;
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read '{}'", dir.display()))? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        // accept both bare numbers and `NNNNN-label` style names
        let digits = name.split('-').next().unwrap_or(name);
        if let Ok(n) = digits.parse::<u32>() {
            highest = Some(highest.map_or(n, |h| h.max(n)));
        }
    }
    Ok(highest.map_or(0, |h| h + 1))
}

pub fn save_frame(path: &Path, image: &RgbaImage) -> anyhow::Result<()> {
    image
        .save(path)
        .with_context(|| format!("failed to write frame '{}'", path.display()))
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    #[serde(flatten)]
    pub step: MorphStep,
    pub path: PathBuf,
}

/// Everything needed to reproduce or inspect a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub keyframes: Vec<String>,
    pub template: String,
    pub negative_prompt: String,
    pub images_per_pair: usize,
    pub frames: Vec<FrameRecord>,
    pub preview: Vec<PathBuf>,
    pub video: Option<PathBuf>,
    pub interrupted: bool,
}

pub fn write_manifest(run: &RunDir, manifest: &RunManifest) -> anyhow::Result<()> {
    let path = run.manifest_path();
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write manifest '{}'", path.display()))
}
