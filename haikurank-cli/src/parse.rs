/// Judge response parsing and validation.
///
/// Models wrap JSON in code fences or surround it with prose often enough that
/// a strict `serde_json::from_str` on the raw text is not sufficient. The
/// cascade is: strip fences, parse directly, otherwise parse the first
/// balanced `{...}` block.
use std::sync::LazyLock;

use haikurank_core::constants::{MAX_DIMENSION_SCORE, MIN_DIMENSION_SCORE};
use haikurank_core::{Dimension, DimensionScores, Verdict, Winner};
use regex::Regex;
use serde_json::Value;

use crate::error::VerdictError;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("valid fence pattern"));

fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// First `{...}` block with balanced braces, ignoring braces inside strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the JSON object in a judge response.
pub fn extract_json(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&cleaned) {
        return Some(value);
    }

    let block = first_balanced_object(&cleaned)?;
    match serde_json::from_str::<Value>(block) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn parse_score(side: &'static str, dim: Dimension, raw: Option<&Value>) -> Result<u8, VerdictError> {
    let raw = raw.ok_or(VerdictError::MissingDimension {
        side,
        dimension: dim.key(),
    })?;
    let invalid = || VerdictError::InvalidScore {
        side,
        dimension: dim.key(),
        value: raw.to_string(),
    };

    let value = raw.as_f64().ok_or_else(invalid)?;
    let in_range = value >= f64::from(MIN_DIMENSION_SCORE) && value <= f64::from(MAX_DIMENSION_SCORE);
    if !in_range || value.fract() != 0.0 {
        return Err(invalid());
    }
    Ok(value as u8)
}

fn parse_side(root: &Value, side: &'static str) -> Result<DimensionScores, VerdictError> {
    let scores = root
        .get(side)
        .and_then(Value::as_object)
        .ok_or(VerdictError::MissingSide { side })?;

    let mut parsed = DimensionScores::default();
    for dim in Dimension::ALL {
        *parsed.get_mut(dim) = parse_score(side, dim, scores.get(dim.key()))?;
    }
    Ok(parsed)
}

fn parse_winner(root: &Value) -> Result<Winner, VerdictError> {
    let raw = root.get("winner");
    match raw.and_then(Value::as_str) {
        Some("a") => Ok(Winner::A),
        Some("b") => Ok(Winner::B),
        Some("draw") => Ok(Winner::Draw),
        _ => Err(VerdictError::InvalidWinner(
            raw.map(Value::to_string).unwrap_or_else(|| "(missing)".to_string()),
        )),
    }
}

/// Parse and validate a raw judge response into a `Verdict`.
///
/// Every dimension must be an integer in 1..=5 on both sides and the winner
/// one of `a`, `b`, `draw`. A missing `reasoning` is tolerated as empty.
pub fn parse_verdict(text: &str) -> Result<Verdict, VerdictError> {
    let root = extract_json(text).ok_or(VerdictError::NoJson)?;

    let a = parse_side(&root, "a")?;
    let b = parse_side(&root, "b")?;
    let winner = parse_winner(&root)?;
    let reasoning = root
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(Verdict {
        a,
        b,
        winner,
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
  "a": {"image_precision": 4, "cut": 5, "economy": 4, "resonance": 3, "originality": 4, "musicality": 3},
  "b": {"image_precision": 2, "cut": 3, "economy": 3, "resonance": 2, "originality": 2, "musicality": 3},
  "winner": "a",
  "reasoning": "Poem A's cut opens a gap the reader has to cross."
}"#;

    #[test]
    fn test_valid_response_accepted() {
        let verdict = parse_verdict(VALID).unwrap();
        assert_eq!(verdict.winner, Winner::A);
        assert_eq!(verdict.a.cut, 5);
        assert_eq!(verdict.b.image_precision, 2);
        assert_eq!(verdict.totals(), (23, 15));
        assert_eq!(verdict.reasoning, "Poem A's cut opens a gap the reader has to cross.");
    }

    #[test]
    fn test_code_fences_stripped() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_verdict(&fenced).is_ok());

        let bare_fence = format!("```\n{VALID}\n```");
        assert!(parse_verdict(&bare_fence).is_ok());
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let text = format!("Here is my evaluation:\n{VALID}\nHope that helps {{with}} your corpus.");
        let verdict = parse_verdict(&text).unwrap();
        assert_eq!(verdict.winner, Winner::A);
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_extraction() {
        let text = r#"Sure. {"a": {"image_precision": 3, "cut": 3, "economy": 3, "resonance": 3, "originality": 3, "musicality": 3}, "b": {"image_precision": 3, "cut": 3, "economy": 3, "resonance": 3, "originality": 3, "musicality": 3}, "winner": "draw", "reasoning": "Both close with a } and a \" quote."} trailing"#;
        let verdict = parse_verdict(text).unwrap();
        assert_eq!(verdict.winner, Winner::Draw);
        assert_eq!(verdict.reasoning, "Both close with a } and a \" quote.");
    }

    #[test]
    fn test_missing_dimension_rejected() {
        let text = VALID.replace("\"musicality\": 3}", "\"rhythm\": 3}");
        assert!(matches!(
            parse_verdict(&text),
            Err(VerdictError::MissingDimension { side: "a", dimension: "musicality" })
        ));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let text = VALID.replace("\"cut\": 5", "\"cut\": 6");
        assert!(matches!(
            parse_verdict(&text),
            Err(VerdictError::InvalidScore { side: "a", dimension: "cut", .. })
        ));

        let text = VALID.replace("\"cut\": 5", "\"cut\": 0");
        assert!(parse_verdict(&text).is_err());
    }

    #[test]
    fn test_non_integer_scores_rejected() {
        let text = VALID.replace("\"cut\": 5", "\"cut\": \"5\"");
        assert!(matches!(parse_verdict(&text), Err(VerdictError::InvalidScore { .. })));

        let text = VALID.replace("\"cut\": 5", "\"cut\": 3.5");
        assert!(matches!(parse_verdict(&text), Err(VerdictError::InvalidScore { .. })));

        // Integral floats are fine
        let text = VALID.replace("\"cut\": 5", "\"cut\": 5.0");
        assert_eq!(parse_verdict(&text).unwrap().a.cut, 5);
    }

    #[test]
    fn test_bad_winner_rejected() {
        let text = VALID.replace("\"winner\": \"a\"", "\"winner\": \"c\"");
        assert_eq!(parse_verdict(&text), Err(VerdictError::InvalidWinner("\"c\"".into())));

        let text = VALID.replace("\"winner\": \"a\",", "");
        assert!(matches!(parse_verdict(&text), Err(VerdictError::InvalidWinner(_))));
    }

    #[test]
    fn test_winner_must_match_exactly() {
        for bad in ["Draw", "A", " b ", "B"] {
            let text = VALID.replace("\"winner\": \"a\"", &format!("\"winner\": \"{bad}\""));
            assert!(
                matches!(parse_verdict(&text), Err(VerdictError::InvalidWinner(_))),
                "{bad:?} accepted"
            );
        }
        let text = VALID.replace("\"winner\": \"a\"", "\"winner\": \"draw\"");
        assert_eq!(parse_verdict(&text).unwrap().winner, Winner::Draw);
    }

    #[test]
    fn test_missing_side_rejected() {
        let text = r#"{"a": {"image_precision": 3, "cut": 3, "economy": 3, "resonance": 3, "originality": 3, "musicality": 3}, "winner": "a"}"#;
        assert_eq!(parse_verdict(text), Err(VerdictError::MissingSide { side: "b" }));
    }

    #[test]
    fn test_missing_reasoning_tolerated() {
        let text = VALID.replace(
            ",\n  \"reasoning\": \"Poem A's cut opens a gap the reader has to cross.\"",
            "",
        );
        assert_eq!(parse_verdict(&text).unwrap().reasoning, "");
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(parse_verdict("I prefer the first one."), Err(VerdictError::NoJson));
        assert_eq!(parse_verdict("{not json at all}"), Err(VerdictError::NoJson));
        assert_eq!(parse_verdict("[1, 2, 3]"), Err(VerdictError::NoJson));
    }
}
