use crate::config::RecommendationConfig;

pub const POWER_TIP: &str =
    "Jump height is below target: add explosive power work such as squat jumps and plyometric box jumps.";
pub const SYMMETRY_TIP: &str =
    "Left/right imbalance detected: include unilateral training such as single-leg squats and lunges.";
pub const TECHNIQUE_TIP: &str =
    "Knee bend is far from optimal: practise a controlled countermovement and drive through the full range.";
pub const POSITIVE_FEEDBACK: &str = "Great jump! Height, balance and form are all on target. Keep it up.";

/// スコアからアドバイスを決定的に生成する（I/Oなし）
///
/// 低い項目ごとに1件、順序は 高さ → 対称性 → 技術。どれも問題なければ肯定的な1件。
pub fn recommendations(
    max_height_cm: f64,
    symmetry_score: f64,
    technique_score: f64,
    config: &RecommendationConfig,
) -> Vec<String> {
    let mut tips = Vec::new();
    if max_height_cm < config.low_height_cm {
        tips.push(POWER_TIP.to_string());
    }
    if symmetry_score < config.low_symmetry {
        tips.push(SYMMETRY_TIP.to_string());
    }
    if technique_score < config.low_technique {
        tips.push(TECHNIQUE_TIP.to_string());
    }
    if tips.is_empty() {
        tips.push(POSITIVE_FEEDBACK.to_string());
    }
    tips
}
