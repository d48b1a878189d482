use crate::error::{MorphError, Result};

/// Seed field of a keyframe line.
///
/// A blank field reuses the seed resolved for the previous keyframe,
/// `-1` asks for a fresh random seed, anything else is taken literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSpec {
    Inherit,
    Random,
    Fixed(i64),
}

impl SeedSpec {
    pub fn parse(field: &str) -> Result<Self> {
        let field = field.trim();
        if field.is_empty() {
            return Ok(Self::Inherit);
        }
        if field == "-1" {
            return Ok(Self::Random);
        }
        field
            .parse::<i64>()
            .map(Self::Fixed)
            .map_err(|_| MorphError::keyframe(format!("invalid seed field '{field}'")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub seed: SeedSpec,
    pub prompt: String,
}

/// Parse a multi-line keyframe block, one keyframe per line.
///
/// Line format is `seed | prompt` or just `prompt`. Blank lines are
/// ignored. At least two keyframes are required.
pub fn parse_keyframes(text: &str) -> Result<Vec<Keyframe>> {
    let mut keyframes = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (seed, prompt) = match line.split_once('|') {
            Some((seed, prompt)) => (SeedSpec::parse(seed)?, prompt.trim()),
            None => (SeedSpec::Inherit, line),
        };
        keyframes.push(Keyframe {
            seed,
            prompt: prompt.to_string(),
        });
    }

    if keyframes.len() < 2 {
        return Err(MorphError::keyframe(format!(
            "at least 2 keyframes required, found {}",
            keyframes.len()
        )));
    }

    Ok(keyframes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_and_prompt() {
        let frames = parse_keyframes("42 | a red cube\n7 | a blue sphere").unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].seed, SeedSpec::Fixed(42));
        assert_eq!(frames[0].prompt, "a red cube");
        assert_eq!(frames[1].seed, SeedSpec::Fixed(7));
    }

    #[test]
    fn bare_prompt_inherits_seed() {
        let frames = parse_keyframes("a red cube\na blue sphere").unwrap();
        assert_eq!(frames[0].seed, SeedSpec::Inherit);
        assert_eq!(frames[1].prompt, "a blue sphere");
    }

    #[test]
    fn minus_one_is_random() {
        let frames = parse_keyframes("-1 | cube\n | sphere").unwrap();
        assert_eq!(frames[0].seed, SeedSpec::Random);
        assert_eq!(frames[1].seed, SeedSpec::Inherit);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let frames = parse_keyframes("\ncube\n\n\nsphere\n").unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn fewer_than_two_keyframes_is_an_error() {
        let err = parse_keyframes("only one").unwrap_err();
        assert!(err.to_string().contains("at least 2 keyframes"));

        let err = parse_keyframes("\n\n").unwrap_err();
        assert!(err.to_string().contains("found 0"));
    }

    #[test]
    fn garbage_seed_is_an_error() {
        let err = parse_keyframes("abc | cube\nsphere").unwrap_err();
        assert!(err.to_string().contains("invalid seed field 'abc'"));
    }
}
