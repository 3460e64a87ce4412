//! Turns the model's free-form reply into an [`AnalysisResult`].
//!
//! The model is asked for bare JSON but does not always comply, so fences are
//! stripped and every field is validated on its own, with defaults filled in
//! rather than trusting the shape of the reply.

use crate::locale;
use crate::models::{
    AnalysisRequest, AnalysisResult, CarbonFootprint, DietaryPreference, FoodAnalysis,
};
use serde_json::{Map, Value};

pub const UNREADABLE_REASON: &str =
    "Analysis succeeded but data format was unreadable. Please try again.";
pub const NOT_FOOD_REASON: &str = "Not a recognizable consumable item.";

const DEFAULT_HEALTH_SCORE: u32 = 50;

/// Remove a surrounding markdown code fence (with or without a `json` tag).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

pub fn parse_model_output(raw: &str, request: &AnalysisRequest) -> AnalysisResult {
    let body = strip_code_fences(raw);

    let object = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            tracing::error!("Model returned JSON that is not an object: {}", other);
            return AnalysisResult::non_food(UNREADABLE_REASON);
        }
        Err(e) => {
            tracing::error!("Failed to parse model output as JSON: {}\nBody: {}", e, body);
            return AnalysisResult::non_food(UNREADABLE_REASON);
        }
    };

    if object.get("isFood") == Some(&Value::Bool(false)) {
        let reason = text_field(&object, "reason").unwrap_or_else(|| NOT_FOOD_REASON.to_string());
        return AnalysisResult::NonFood { reason };
    }

    AnalysisResult::Food(food_from_object(&object, request))
}

fn food_from_object(object: &Map<String, Value>, request: &AnalysisRequest) -> FoodAnalysis {
    let (is_safe, warning) = diet_check(object, request.dietary_preference);

    FoodAnalysis {
        food_name: text_field(object, "foodName")
            .unwrap_or_else(|| locale::unknown_food_name(&request.language).to_string()),
        calories: int_field(object, "calories", 0, u32::MAX),
        protein: int_field(object, "protein", 0, u32::MAX),
        carbs: int_field(object, "carbs", 0, u32::MAX),
        fat: int_field(object, "fat", 0, u32::MAX),
        health_score: score_field(object, "healthScore", DEFAULT_HEALTH_SCORE),
        brief_tip: text_field(object, "briefTip").unwrap_or_default(),
        confidence: score_field(object, "confidence", 0),
        is_safe,
        warning,
        carbon_footprint: object
            .get("carbonFootprint")
            .and_then(Value::as_str)
            .and_then(CarbonFootprint::from_label)
            .unwrap_or_default(),
        sustainability_tip: text_field(object, "sustainabilityTip").unwrap_or_default(),
        next_action_tip: text_field(object, "nextActionTip"),
    }
}

/// An unsafe verdict always carries a warning; a safe one never does.
fn diet_check(
    object: &Map<String, Value>,
    preference: DietaryPreference,
) -> (bool, Option<String>) {
    let warning = text_field(object, "warning");
    let is_safe = match object.get("isSafe") {
        Some(Value::Bool(safe)) => *safe,
        _ => warning.is_none(),
    };

    if is_safe {
        return (true, None);
    }

    let warning = warning.unwrap_or_else(|| match preference {
        DietaryPreference::None => "May not suit your dietary needs.".to_string(),
        diet => format!("Not suitable for {} diet.", diet.label()),
    });
    (false, Some(warning))
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts JSON numbers and numeric strings such as `"250"`, `"+5"` or `"250 kcal"`.
fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|(i, c)| {
                    let sign = *i == 0 && (*c == '-' || *c == '+');
                    !(c.is_ascii_digit() || *c == '.' || sign)
                })
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse::<f64>().ok()
        }
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn int_field(object: &Map<String, Value>, key: &str, default: u32, max: u32) -> u32 {
    match object.get(key).and_then(numeric) {
        Some(n) => n.round().clamp(0.0, f64::from(max)) as u32,
        None => default,
    }
}

fn score_field(object: &Map<String, Value>, key: &str, default: u32) -> u8 {
    int_field(object, key, default, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToneMode;
    use pretty_assertions::assert_eq;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("img")
    }

    const FULL: &str = r#"{
        "isFood": true,
        "foodName": "Margherita Pizza",
        "calories": 800,
        "protein": 30,
        "carbs": 95,
        "fat": 32,
        "healthScore": 45,
        "briefTip": "Pair it with a salad.",
        "confidence": 88,
        "isSafe": true,
        "warning": null,
        "carbonFootprint": "Medium",
        "sustainabilityTip": "Pick a local pizzeria.",
        "nextActionTip": "Take a 15-minute walk."
    }"#;

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```JSON{}```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("{}\n```"), "{}");
    }

    #[test]
    fn test_full_response_passes_through() {
        let result = parse_model_output(FULL, &request());
        let food = result.food().unwrap();

        assert_eq!(food.food_name, "Margherita Pizza");
        assert_eq!(food.calories, 800);
        assert_eq!(food.health_score, 45);
        assert_eq!(food.confidence, 88);
        assert_eq!(food.carbon_footprint, CarbonFootprint::Medium);
        assert_eq!(food.next_action_tip.as_deref(), Some("Take a 15-minute walk."));
        assert!(food.is_safe);
        assert_eq!(food.warning, None);
    }

    #[test]
    fn test_missing_protein_and_health_score_are_backfilled() {
        let raw = r#"{"isFood": true, "foodName": "Rice", "calories": 200, "carbs": 45, "fat": 1, "briefTip": "Fine.", "confidence": 70}"#;
        let food = parse_model_output(raw, &request()).food().cloned().unwrap();

        assert_eq!(food.protein, 0);
        assert_eq!(food.health_score, 50);
        assert_eq!(food.food_name, "Rice");
        assert_eq!(food.calories, 200);
        assert_eq!(food.carbs, 45);
        assert_eq!(food.fat, 1);
        assert_eq!(food.brief_tip, "Fine.");
        assert_eq!(food.confidence, 70);
    }

    #[test]
    fn test_numeric_coercion_and_clamping() {
        let raw = r#"{"calories": "350 kcal", "protein": 12.6, "carbs": -4, "fat": "n/a", "healthScore": 140, "confidence": "85"}"#;
        let food = parse_model_output(raw, &request()).food().cloned().unwrap();

        assert_eq!(food.calories, 350);
        assert_eq!(food.protein, 13);
        assert_eq!(food.carbs, 0);
        assert_eq!(food.fat, 0);
        assert_eq!(food.health_score, 100);
        assert_eq!(food.confidence, 85);
    }

    #[test]
    fn test_explicitly_signed_numeric_strings() {
        let raw = r#"{"calories": "+5", "protein": "+12 g", "carbs": "-3"}"#;
        let food = parse_model_output(raw, &request()).food().cloned().unwrap();

        assert_eq!(food.calories, 5);
        assert_eq!(food.protein, 12);
        assert_eq!(food.carbs, 0);
    }

    #[test]
    fn test_missing_is_food_counts_as_food() {
        let result = parse_model_output(r#"{"foodName": "Tea"}"#, &request());
        assert!(result.is_food());
    }

    #[test]
    fn test_missing_food_name_is_localized() {
        let req = request().with_language("ko");
        let food = parse_model_output(r#"{"isFood": true}"#, &req).food().cloned().unwrap();
        assert_eq!(food.food_name, "알 수 없는 부분 인식됨");
    }

    #[test]
    fn test_non_food_keeps_reason() {
        let result = parse_model_output(
            r#"{"isFood": false, "reason": "That is a bicycle."}"#,
            &request(),
        );
        assert_eq!(result, AnalysisResult::non_food("That is a bicycle."));
    }

    #[test]
    fn test_non_food_without_reason_gets_default() {
        let result = parse_model_output(r#"{"isFood": false}"#, &request());
        assert_eq!(result.reason(), Some(NOT_FOOD_REASON));
    }

    #[test]
    fn test_malformed_json_is_unreadable() {
        let result = parse_model_output("Sure! Here is your analysis: {", &request());
        assert_eq!(result.reason(), Some(UNREADABLE_REASON));
    }

    #[test]
    fn test_non_object_json_is_unreadable() {
        let result = parse_model_output("[1, 2, 3]", &request());
        assert_eq!(result.reason(), Some(UNREADABLE_REASON));
    }

    #[test]
    fn test_unsafe_without_warning_gets_templated_warning() {
        let req = request().with_dietary_preference(DietaryPreference::Vegan);
        let food = parse_model_output(r#"{"isSafe": false, "warning": null}"#, &req)
            .food()
            .cloned()
            .unwrap();

        assert!(!food.is_safe);
        assert_eq!(food.warning.as_deref(), Some("Not suitable for vegan diet."));
    }

    #[test]
    fn test_warning_without_verdict_marks_unsafe() {
        let req = request()
            .with_dietary_preference(DietaryPreference::Halal)
            .with_tone(ToneMode::Roast);
        let food = parse_model_output(
            r#"{"warning": "Contains pork, not suitable for halal diet."}"#,
            &req,
        )
        .food()
        .cloned()
        .unwrap();

        assert!(!food.is_safe);
        assert_eq!(
            food.warning.as_deref(),
            Some("Contains pork, not suitable for halal diet.")
        );
    }

    #[test]
    fn test_safe_verdict_clears_stray_warning() {
        let food = parse_model_output(r#"{"isSafe": true, "warning": "n/a"}"#, &request())
            .food()
            .cloned()
            .unwrap();
        assert!(food.is_safe);
        assert_eq!(food.warning, None);
    }

    #[test]
    fn test_carbon_footprint_is_case_insensitive() {
        let food = parse_model_output(r#"{"carbonFootprint": "HIGH"}"#, &request())
            .food()
            .cloned()
            .unwrap();
        assert_eq!(food.carbon_footprint, CarbonFootprint::High);

        let food = parse_model_output(r#"{"carbonFootprint": "enormous"}"#, &request())
            .food()
            .cloned()
            .unwrap();
        assert_eq!(food.carbon_footprint, CarbonFootprint::Medium);
    }
}
