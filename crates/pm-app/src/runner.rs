use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chrono::Utc;
use image::RgbaImage;
use log::{debug, info, warn};
use pm_core::keyframe::{Keyframe, SeedSpec};
use pm_core::prompt::single_line;
use pm_core::{JobProgress, MorphPlan, PromptTemplate, evenly_spaced, parse_keyframes};

use crate::backend::RenderBackend;
use crate::output::{FrameRecord, RunDir, RunManifest, save_frame, write_manifest};
use crate::video::{VideoConfig, VideoEncoder, is_ffmpeg_on_path};

/// At most this many frames are listed as the preview selection.
pub const PREVIEW_LIMIT: usize = 25;

#[derive(Debug, Clone)]
pub struct MorphRequest {
    pub keyframe_text: String,
    pub template: String,
    pub negative_prompt: String,
    pub images_per_pair: usize,
    pub save_video: bool,
    pub fps: u32,
    pub out_root: PathBuf,
}

/// Validated inputs, ready to render. No render call is issued until
/// everything here has succeeded.
#[derive(Debug)]
pub struct PreparedMorph {
    pub plan: MorphPlan,
    pub keyframes: Vec<Keyframe>,
    pub negative_prompt: String,
}

pub fn prepare(req: &MorphRequest) -> pm_core::Result<PreparedMorph> {
    let keyframes = parse_keyframes(&req.keyframe_text)?;
    let template = PromptTemplate::new(&single_line(&req.template, "prompt")?)?;
    let negative_prompt = single_line(&req.negative_prompt, "negative prompt")?;
    let plan = MorphPlan::build(
        &keyframes,
        &template,
        req.images_per_pair,
        &mut rand::rng(),
    )?;

    Ok(PreparedMorph {
        plan,
        keyframes,
        negative_prompt,
    })
}

#[derive(Debug)]
pub struct MorphOutcome {
    pub run_dir: PathBuf,
    pub frames: Vec<PathBuf>,
    pub preview: Vec<PathBuf>,
    pub video: Option<PathBuf>,
    pub interrupted: bool,
}

/// Render the whole morph sequence: one synchronous backend call per
/// step, frames saved as they arrive, then preview sampling, optional
/// video encoding and the run manifest.
pub fn run(
    req: &MorphRequest,
    backend: &RenderBackend,
    interrupt: Arc<AtomicBool>,
) -> anyhow::Result<MorphOutcome> {
    let prepared = prepare(req)?;
    let plan = &prepared.plan;

    let mut save_video = req.save_video;
    if save_video && !is_ffmpeg_on_path() {
        warn!("ffmpeg not found on PATH, video output disabled");
        save_video = false;
    }

    let started_at = Utc::now();
    let run = RunDir::create(&req.out_root)?;
    info!(
        "morph run {:05}: {} frames into '{}'",
        run.number,
        plan.frame_count(),
        run.path.display()
    );

    let mut progress = JobProgress::with_interrupt(plan.frame_count(), interrupt);
    let mut images: Vec<RgbaImage> = Vec::with_capacity(plan.frame_count());
    let mut records: Vec<FrameRecord> = Vec::with_capacity(plan.frame_count());
    let mut interrupted = false;

    for step in &plan.steps {
        if progress.interrupted() {
            warn!("interrupted after {} of {} frames", progress.done(), progress.total());
            interrupted = true;
            break;
        }

        info!("{} ({:3.0}%)", plan.describe(step), progress.fraction() * 100.0);
        debug!("prompt: {}", step.prompt);
        debug!("negative prompt: {}", prepared.negative_prompt);

        let image = backend.render_step(step, &prepared.negative_prompt)?;
        let path = run.frame_path(step.frame);
        save_frame(&path, &image)?;

        images.push(image);
        records.push(FrameRecord {
            step: step.clone(),
            path,
        });
        progress.advance();
    }

    let frames: Vec<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
    let preview = evenly_spaced(&frames, PREVIEW_LIMIT);

    let video = if save_video && !images.is_empty() {
        Some(encode_video(&run, &images, req.fps)?)
    } else {
        None
    };

    let manifest = RunManifest {
        started_at,
        finished_at: Utc::now(),
        keyframes: prepared.keyframes.iter().map(keyframe_line).collect(),
        template: req.template.trim().to_string(),
        negative_prompt: prepared.negative_prompt.clone(),
        images_per_pair: req.images_per_pair,
        frames: records,
        preview: preview.clone(),
        video: video.clone(),
        interrupted,
    };
    write_manifest(&run, &manifest)?;

    Ok(MorphOutcome {
        run_dir: run.path,
        frames,
        preview,
        video,
        interrupted,
    })
}

fn encode_video(run: &RunDir, images: &[RgbaImage], fps: u32) -> anyhow::Result<PathBuf> {
    let first = &images[0];
    let cfg = VideoConfig {
        width: first.width(),
        height: first.height(),
        fps,
        out_path: run.video_path(),
    };

    let mut encoder = VideoEncoder::new(cfg)?;
    for image in images {
        encoder.write_frame(image)?;
    }
    encoder.finish()?;

    info!("wrote video '{}'", run.video_path().display());
    Ok(run.video_path())
}

/// Keyframe in the `seed | prompt` input form, for the manifest.
fn keyframe_line(keyframe: &Keyframe) -> String {
    match keyframe.seed {
        SeedSpec::Fixed(seed) => format!("{seed} | {}", keyframe.prompt),
        SeedSpec::Random => format!("-1 | {}", keyframe.prompt),
        SeedSpec::Inherit => keyframe.prompt.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(keyframes: &str, template: &str, negative: &str) -> MorphRequest {
        MorphRequest {
            keyframe_text: keyframes.to_string(),
            template: template.to_string(),
            negative_prompt: negative.to_string(),
            images_per_pair: 5,
            save_video: false,
            fps: 5,
            out_root: PathBuf::from("outputs"),
        }
    }

    #[test]
    fn valid_input_produces_a_plan() {
        let prepared = prepare(&request("1 | cube\n2 | sphere", "photo of [subject]", "")).unwrap();
        assert_eq!(prepared.plan.frame_count(), 5);
        assert_eq!(prepared.keyframes.len(), 2);
    }

    #[test]
    fn too_few_keyframes_fails_before_any_render() {
        let err = prepare(&request("cube", "photo of [subject]", "")).unwrap_err();
        assert!(err.to_string().contains("at least 2 keyframes"));
    }

    #[test]
    fn multi_line_prompt_fails() {
        let err = prepare(&request("a\nb", "photo of [subject]\nextra", "")).unwrap_err();
        assert!(err.to_string().contains("one line"));
    }

    #[test]
    fn multi_line_negative_prompt_fails() {
        let err = prepare(&request("a\nb", "photo of [subject]", "ugly\nblurry")).unwrap_err();
        assert!(err.to_string().contains("negative prompt"));
    }

    #[test]
    fn missing_placeholder_fails() {
        let err = prepare(&request("a\nb", "photo of a cat", "")).unwrap_err();
        assert!(err.to_string().contains("[subject]"));
    }

    #[test]
    fn manifest_keyframe_lines_round_trip_the_input_form() {
        let prepared = prepare(&request("1 | cube\n-1 | sphere\n | cone", "[subject]", "")).unwrap();
        let lines: Vec<String> = prepared.keyframes.iter().map(keyframe_line).collect();
        assert_eq!(lines, vec!["1 | cube", "-1 | sphere", "cone"]);
    }
}
