use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::error::{MorphError, Result};
use crate::keyframe::{Keyframe, SeedSpec};
use crate::prompt::{PromptTemplate, WeightedPrompt, blend};

/// One render invocation of the morph sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphStep {
    /// 1-based index of the keyframe pair this step belongs to.
    pub segment: usize,
    /// 0-based step index within the pair.
    pub step: usize,
    /// Global frame index, contiguous across segments.
    pub frame: usize,
    /// Interpolation fraction within the pair.
    pub t: f64,
    pub prompt: String,
    pub seed: i64,
    pub subseed: i64,
    pub subseed_strength: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphPlan {
    pub steps: Vec<MorphStep>,
    pub segments: usize,
    pub images_per_pair: usize,
}

impl MorphPlan {
    /// Build the full step plan for a keyframe sequence.
    ///
    /// Each consecutive pair contributes `images_per_pair` evenly spaced
    /// steps; the duplicate boundary step is skipped for every pair after
    /// the first, so the total frame count is
    /// `1 + (images_per_pair - 1) * (keyframes - 1)`.
    pub fn build(
        keyframes: &[Keyframe],
        template: &PromptTemplate,
        images_per_pair: usize,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if keyframes.len() < 2 {
            return Err(MorphError::plan(format!(
                "at least 2 keyframes required, found {}",
                keyframes.len()
            )));
        }
        if images_per_pair < 2 {
            return Err(MorphError::plan(format!(
                "at least 2 images per keyframe pair required, got {images_per_pair}"
            )));
        }

        let seeds = resolve_seeds(keyframes, rng);
        let parsed: Vec<WeightedPrompt> = keyframes
            .iter()
            .map(|k| WeightedPrompt::parse(&k.prompt))
            .collect();

        let segments = keyframes.len() - 1;
        let mut steps = Vec::with_capacity(1 + (images_per_pair - 1) * segments);
        let mut frame = 0;

        for segment in 1..=segments {
            let source = &parsed[segment - 1];
            let target = &parsed[segment];
            let seed = seeds[segment - 1];
            let subseed = seeds[segment];

            for step in 0..images_per_pair {
                // first image of a pair repeats the last of the previous one
                if step == 0 && segment > 1 {
                    continue;
                }
                let t = step as f64 / (images_per_pair - 1) as f64;
                steps.push(MorphStep {
                    segment,
                    step,
                    frame,
                    t,
                    prompt: template.insert(&blend(source, target, t)),
                    seed,
                    subseed,
                    subseed_strength: if seed == subseed { 0.0 } else { t },
                });
                frame += 1;
            }
        }

        debug!(
            "planned {} frames over {} segments ({} images per pair)",
            steps.len(),
            segments,
            images_per_pair
        );

        Ok(Self {
            steps,
            segments,
            images_per_pair,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.steps.len()
    }

    /// Progress label in the shape `Morph 2/3, image 5/25`.
    pub fn describe(&self, step: &MorphStep) -> String {
        format!(
            "Morph {}/{}, image {}/{}",
            step.segment,
            self.segments,
            step.step + 1,
            self.images_per_pair
        )
    }
}

/// Resolve every keyframe seed once, in order.
///
/// `Inherit` reuses the previous keyframe's resolved seed (the first
/// keyframe draws a random one), `Random` always draws fresh.
fn resolve_seeds(keyframes: &[Keyframe], rng: &mut impl Rng) -> Vec<i64> {
    let mut seeds = Vec::with_capacity(keyframes.len());
    let mut previous: Option<i64> = None;
    for keyframe in keyframes {
        let seed = match keyframe.seed {
            SeedSpec::Fixed(seed) => seed,
            SeedSpec::Random => random_seed(rng),
            SeedSpec::Inherit => previous.unwrap_or_else(|| random_seed(rng)),
        };
        seeds.push(seed);
        previous = Some(seed);
    }
    seeds
}

fn random_seed(rng: &mut impl Rng) -> i64 {
    rng.random_range(0..=i64::from(u32::MAX))
}

/// Pick `n` evenly spaced elements, always keeping the last one.
pub fn evenly_spaced<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    if n == 0 || items.is_empty() {
        return Vec::new();
    }
    if items.len() <= n {
        return items.to_vec();
    }
    (0..n)
        .map(|i| {
            let index = (i as f64 / (n - 1) as f64 * (items.len() - 1) as f64).ceil() as usize;
            items[index].clone()
        })
        .collect()
}
