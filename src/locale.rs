//! Fixed, locale-dependent strings that never come from the model.

/// Primary language subtag, lowercased (`"en-US"` → `"en"`).
pub fn primary_tag(language: &str) -> String {
    language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("en")
        .to_ascii_lowercase()
}

/// Food name reported by the offline stand-in analyzer.
pub fn stub_food_name(language: &str) -> &'static str {
    match primary_tag(language).as_str() {
        "ko" => "브로콜리 스프 (모의)",
        "ja" => "ブロッコリースープ (模擬)",
        "es" => "Sopa de brócoli (simulada)",
        "fr" => "Soupe de brocoli (simulée)",
        "zh" => "西兰花汤 (模拟)",
        _ => "Mock Broccoli Soup",
    }
}

/// Name used when the model recognized food but did not say what it was.
pub fn unknown_food_name(language: &str) -> &'static str {
    match primary_tag(language).as_str() {
        "ko" => "알 수 없는 부분 인식됨",
        "ja" => "一部認識された食品",
        "es" => "Alimento reconocido parcialmente",
        "fr" => "Aliment partiellement reconnu",
        "zh" => "部分识别的食物",
        _ => "Partially Recognized Item",
    }
}
