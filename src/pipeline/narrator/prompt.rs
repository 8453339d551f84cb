use crate::models::{Domain, RankedContributor};

pub const NARRATOR_SYSTEM_PROMPT: &str = "You are a helpful health assistant.";

/// Render the contributors as one line each.
pub fn format_contributors(contributors: &[RankedContributor]) -> String {
    contributors
        .iter()
        .map(|c| {
            format!(
                "- {} (value {}): {}, attribution {:.4}",
                c.feature, c.value, c.impact, c.shap
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt for a positive prediction.
pub fn build_narrative_prompt(
    domain: Domain,
    contributors: &[RankedContributor],
    probability: f64,
    label: &str,
) -> String {
    let percent = probability * 100.0;
    let (subject, next_steps) = match domain {
        Domain::Diabetes => (
            format!("{label} (diabetes)"),
            "Also suggest next steps for lifestyle, checkups, and treatment if needed.",
        ),
        Domain::Heart => (
            label.to_string(),
            "Also give guidelines for what the person can do next.",
        ),
    };

    format!(
        "You are a medical assistant AI. Based on the following factors and a predicted \
         probability of {percent:.2}% for {subject}, generate a clear, human-friendly \
         explanation. {next_steps}\n\n\
         Top contributing factors:\n{}\n",
        format_contributors(contributors)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    fn contributors() -> Vec<RankedContributor> {
        vec![
            RankedContributor {
                feature: "HighBP".into(),
                value: 1.0,
                impact: "increased risk",
                shap: 0.5321,
                direction: Direction::Increased,
            },
            RankedContributor {
                feature: "GenHlth".into(),
                value: 2.0,
                impact: "reduced risk",
                shap: -0.25,
                direction: Direction::Reduced,
            },
        ]
    }

    #[test]
    fn diabetes_prompt_mentions_probability_and_label() {
        let prompt = build_narrative_prompt(Domain::Diabetes, &contributors(), 0.73456, "Yes");
        assert!(prompt.contains("73.46%"));
        assert!(prompt.contains("Yes (diabetes)"));
        assert!(prompt.contains("lifestyle, checkups, and treatment"));
        assert!(prompt.contains("- HighBP (value 1): increased risk, attribution 0.5321"));
    }

    #[test]
    fn heart_prompt_uses_plain_label() {
        let prompt = build_narrative_prompt(Domain::Heart, &contributors(), 0.9, "Heart Disease");
        assert!(prompt.contains("90.00% for Heart Disease,"));
        assert!(prompt.contains("what the person can do next"));
    }

    #[test]
    fn contributors_one_per_line() {
        let text = format_contributors(&contributors());
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().contains("reduced risk"));
    }
}
