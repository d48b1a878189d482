pub mod error;
pub mod keyframe;
pub mod progress;
pub mod prompt;
pub mod sequence;

pub use error::{MorphError, Result};
pub use keyframe::{Keyframe, SeedSpec, parse_keyframes};
pub use progress::JobProgress;
pub use prompt::{PromptTemplate, WeightedPrompt};
pub use sequence::{MorphPlan, MorphStep, evenly_spaced};
