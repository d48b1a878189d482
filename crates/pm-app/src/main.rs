mod backend;
mod config;
mod error;
mod output;
mod runner;
mod video;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::Parser;
use log::info;

use crate::backend::RenderBackend;
use crate::config::{BackendConfig, RenderSettings};
use crate::runner::MorphRequest;

/// Morph between text prompts by rendering one image per interpolation
/// step through an external image-generation service.
#[derive(Parser, Debug)]
#[command(name = "promptmorph", version)]
struct Cli {
    /// Keyframe file, one `seed | prompt` (or bare prompt) per line.
    #[arg(long)]
    keyframes: PathBuf,

    /// Prompt template; must contain `[subject]` exactly once.
    #[arg(long)]
    prompt: String,

    /// Negative prompt applied to every image.
    #[arg(long, default_value = "")]
    negative_prompt: String,

    /// Number of images per keyframe pair (endpoints included).
    #[arg(long, default_value_t = 25)]
    images: usize,

    /// Encode the sequence into a webm video (requires `ffmpeg` on PATH).
    #[arg(long, default_value_t = false)]
    video: bool,

    /// Video frames per second.
    #[arg(long, default_value_t = 5)]
    fps: u32,

    /// Root directory for run output.
    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    /// Render service base URL (overrides PM_BACKEND_URL).
    #[arg(long)]
    backend_url: Option<String>,

    /// Image width in pixels.
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Image height in pixels.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Diffusion sampling steps per image.
    #[arg(long, default_value_t = 20)]
    steps: u32,

    /// Classifier-free guidance scale.
    #[arg(long, default_value_t = 7.0)]
    cfg_scale: f32,

    /// Sampler name forwarded to the service.
    #[arg(long, default_value = "Euler a")]
    sampler: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let keyframe_text = std::fs::read_to_string(&cli.keyframes)
        .with_context(|| format!("failed to read keyframe file '{}'", cli.keyframes.display()))?;

    let config = BackendConfig::load(cli.backend_url.as_deref())?;
    let settings = RenderSettings {
        width: cli.width,
        height: cli.height,
        steps: cli.steps,
        cfg_scale: cli.cfg_scale,
        sampler: cli.sampler.clone(),
    };
    let backend = RenderBackend::new(config, settings);

    let interrupt = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupt);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })?;

    let request = MorphRequest {
        keyframe_text,
        template: cli.prompt,
        negative_prompt: cli.negative_prompt,
        images_per_pair: cli.images,
        save_video: cli.video,
        fps: cli.fps,
        out_root: cli.out,
    };

    let outcome = runner::run(&request, &backend, interrupt)?;

    info!(
        "done: {} frames in '{}'{}",
        outcome.frames.len(),
        outcome.run_dir.display(),
        if outcome.interrupted { " (interrupted)" } else { "" }
    );
    if let Some(video) = &outcome.video {
        info!("video: '{}'", video.display());
    }

    Ok(())
}
