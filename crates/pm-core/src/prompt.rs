use crate::error::{MorphError, Result};

/// Conjunction separating independently weighted sub-terms.
pub const CONJUNCTION: &str = " AND ";

/// Placeholder replaced by the composed morph prompt.
pub const PLACEHOLDER: &str = "[subject]";

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub text: String,
    pub weight: f64,
}

/// A prompt decomposed into weighted sub-terms.
///
/// Sub-terms are separated by ` AND `; a trailing `:number` sets the
/// term weight, otherwise it defaults to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPrompt {
    terms: Vec<WeightedTerm>,
}

impl WeightedPrompt {
    pub fn parse(prompt: &str) -> Self {
        let terms = prompt
            .split(CONJUNCTION)
            .map(|part| {
                let part = part.trim();
                match part.rsplit_once(':') {
                    Some((text, weight)) => match weight.trim().parse::<f64>() {
                        Ok(weight) => WeightedTerm {
                            text: text.trim().to_string(),
                            weight,
                        },
                        // colon belongs to the prompt text, not a weight
                        Err(_) => WeightedTerm {
                            text: part.to_string(),
                            weight: 1.0,
                        },
                    },
                    None => WeightedTerm {
                        text: part.to_string(),
                        weight: 1.0,
                    },
                }
            })
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[WeightedTerm] {
        &self.terms
    }

    /// Render the prompt with every term weight multiplied by `t`.
    pub fn at_weight(&self, t: f64) -> String {
        self.terms
            .iter()
            .map(|term| format!("{}:{}", term.text, term.weight * t))
            .collect::<Vec<_>>()
            .join(CONJUNCTION)
    }
}

/// Compose source at weight `1 - t` and target at weight `t`.
pub fn blend(source: &WeightedPrompt, target: &WeightedPrompt, t: f64) -> String {
    format!(
        "{}{}{}",
        source.at_weight(1.0 - t),
        CONJUNCTION,
        target.at_weight(t)
    )
}

/// Prompt template carrying exactly one `[subject]` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: &str) -> Result<Self> {
        let lines = template.lines().count();
        if lines > 1 {
            return Err(MorphError::prompt(format!(
                "keep the prompt on one line: {lines} lines found"
            )));
        }
        match template.matches(PLACEHOLDER).count() {
            1 => Ok(Self {
                template: template.to_string(),
            }),
            0 => Err(MorphError::prompt(format!(
                "{PLACEHOLDER} not found in prompt, please put one in"
            ))),
            n => Err(MorphError::prompt(format!(
                "expected exactly one {PLACEHOLDER} in prompt, found {n}"
            ))),
        }
    }

    pub fn insert(&self, subject: &str) -> String {
        self.template.replacen(PLACEHOLDER, subject, 1)
    }
}

/// Reject multi-line text fields with a descriptive message.
pub fn single_line(text: &str, what: &str) -> Result<String> {
    let lines = text.lines().count();
    if lines > 1 {
        return Err(MorphError::prompt(format!(
            "keep the {what} on one line: {lines} lines found"
        )));
    }
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unweighted_prompt_defaults_to_one() {
        let p = WeightedPrompt::parse("a red cube");
        assert_eq!(p.terms().len(), 1);
        assert_eq!(p.terms()[0].text, "a red cube");
        assert_eq!(p.terms()[0].weight, 1.0);
    }

    #[test]
    fn parses_conjunction_and_weights() {
        let p = WeightedPrompt::parse("a red cube:2 AND fog:0.5");
        assert_eq!(p.terms().len(), 2);
        assert_eq!(p.terms()[0].weight, 2.0);
        assert_eq!(p.terms()[1].text, "fog");
        assert_eq!(p.terms()[1].weight, 0.5);
    }

    #[test]
    fn non_numeric_suffix_is_prompt_text() {
        let p = WeightedPrompt::parse("style: watercolor");
        assert_eq!(p.terms()[0].text, "style: watercolor");
        assert_eq!(p.terms()[0].weight, 1.0);
    }

    #[test]
    fn at_weight_scales_every_term() {
        let p = WeightedPrompt::parse("cube:2 AND fog");
        assert_eq!(p.at_weight(0.5), "cube:1 AND fog:0.5");
        assert_eq!(p.at_weight(0.0), "cube:0 AND fog:0");
        assert_eq!(p.at_weight(1.0), "cube:2 AND fog:1");
    }

    #[test]
    fn blend_endpoints_are_pure() {
        let source = WeightedPrompt::parse("cube");
        let target = WeightedPrompt::parse("sphere");
        assert_eq!(blend(&source, &target, 0.0), "cube:1 AND sphere:0");
        assert_eq!(blend(&source, &target, 1.0), "cube:0 AND sphere:1");
    }

    #[test]
    fn blend_weight_is_linear_in_t() {
        let source = WeightedPrompt::parse("cube:4");
        let target = WeightedPrompt::parse("sphere:2");
        assert_eq!(blend(&source, &target, 0.25), "cube:3 AND sphere:0.5");
    }

    #[test]
    fn template_requires_one_placeholder() {
        assert!(PromptTemplate::new("photo of [subject], 4k").is_ok());

        let err = PromptTemplate::new("photo of a cat").unwrap_err();
        assert!(err.to_string().contains("[subject] not found"));

        let err = PromptTemplate::new("[subject] and [subject]").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn template_must_be_single_line() {
        let err = PromptTemplate::new("photo of [subject]\n4k").unwrap_err();
        assert!(err.to_string().contains("2 lines found"));
    }

    #[test]
    fn template_insert_replaces_placeholder() {
        let t = PromptTemplate::new("photo of [subject], 4k").unwrap();
        assert_eq!(t.insert("cube:1 AND sphere:0"), "photo of cube:1 AND sphere:0, 4k");
    }

    #[test]
    fn single_line_rejects_multi_line_fields() {
        assert_eq!(single_line("ugly, blurry", "negative prompt").unwrap(), "ugly, blurry");
        let err = single_line("ugly\nblurry", "negative prompt").unwrap_err();
        assert!(err.to_string().contains("negative prompt on one line: 2 lines"));
    }
}
