use serde::{Deserialize, Serialize};

use super::phase::JumpPhase;

/// セッション終了時の解析結果（永続化・UI層へ渡す）
///
/// `landing_force_n` と `takeoff_velocity_mps` は較正係数に依存する推定値。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpAnalysisResult {
    pub max_height_cm: f64,
    pub contact_time_s: f64,
    pub flight_time_s: f64,
    pub takeoff_velocity_mps: f64,
    pub landing_force_n: f64,
    /// 0.0〜1.0
    pub symmetry_score: f64,
    /// 0.0〜1.0
    pub technique_score: f64,
    pub phases: Vec<JumpPhase>,
    pub recommendations: Vec<String>,
}
