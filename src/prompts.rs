use crate::models::{AnalysisRequest, ToneMode};

pub const ANALYSIS: &str = include_str!("../data/prompts/analysis.txt");
pub const TIP_STANDARD: &str = include_str!("../data/prompts/tip_standard.txt");
pub const TIP_ROAST: &str = include_str!("../data/prompts/tip_roast.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Build the full instruction block sent alongside the image.
pub fn analysis_prompt(request: &AnalysisRequest) -> String {
    let language = request.language.as_str();
    let tip_template = match request.tone {
        ToneMode::Standard => TIP_STANDARD,
        ToneMode::Roast => TIP_ROAST,
    };
    let tip_instruction = render(tip_template.trim(), &[("language", language)]);

    let diet = request.dietary_preference;
    let diet_upper = diet.as_str().to_ascii_uppercase();

    render(
        ANALYSIS,
        &[
            ("tip_instruction", &tip_instruction),
            ("diet_upper", &diet_upper),
            ("diet_label", diet.label()),
            ("diet", diet.as_str()),
            ("language", language),
        ],
    )
}
