use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// 保持するフレーム数（30fpsで約10秒）
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// 位相遷移の速度閾値（腰高さ単位/秒）
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,
    /// 関節を採用する信頼度の下限（これを超える必要がある）
    #[serde(default = "default_joint_confidence_threshold")]
    pub joint_confidence_threshold: f32,
    /// 画面全高に相当する高さ（cm）。未キャリブレーション時の仮定値
    #[serde(default = "default_height_calibration_scale")]
    pub height_calibration_scale: f64,
    /// 腰速度（cm/s）→ m/s
    #[serde(default = "default_velocity_calibration")]
    pub velocity_calibration: f64,
    /// 着地速度（cm/s）→ 推定衝撃力（N）。体重約70kg、衝撃時間0.1秒を仮定
    #[serde(default = "default_force_calibration")]
    pub force_calibration: f64,
    /// 理想の膝屈曲角（度）
    #[serde(default = "default_optimal_knee_bend")]
    pub optimal_knee_bend: f64,
    /// 解析に必要な腰高さ付きフレーム数
    #[serde(default = "default_min_valid_frames")]
    pub min_valid_frames: usize,
    /// 接地時間（秒）。接地センサーがないため固定値
    #[serde(default = "default_contact_time_s")]
    pub contact_time_s: f64,
}

fn default_window_capacity() -> usize { 300 }
fn default_velocity_threshold() -> f64 { 0.15 }
fn default_joint_confidence_threshold() -> f32 { 0.3 }
fn default_height_calibration_scale() -> f64 { 200.0 }
fn default_velocity_calibration() -> f64 { 0.01 }
fn default_force_calibration() -> f64 { 7.0 }
fn default_optimal_knee_bend() -> f64 { 90.0 }
fn default_min_valid_frames() -> usize { 10 }
fn default_contact_time_s() -> f64 { 0.25 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            velocity_threshold: default_velocity_threshold(),
            joint_confidence_threshold: default_joint_confidence_threshold(),
            height_calibration_scale: default_height_calibration_scale(),
            velocity_calibration: default_velocity_calibration(),
            force_calibration: default_force_calibration(),
            optimal_knee_bend: default_optimal_knee_bend(),
            min_valid_frames: default_min_valid_frames(),
            contact_time_s: default_contact_time_s(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_capacity == 0 {
            bail!("window_capacity must be at least 1");
        }
        if !(self.velocity_threshold > 0.0) {
            bail!("velocity_threshold must be positive, got {}", self.velocity_threshold);
        }
        if !(0.0..1.0).contains(&self.joint_confidence_threshold) {
            bail!(
                "joint_confidence_threshold must be in [0, 1), got {}",
                self.joint_confidence_threshold
            );
        }
        if !(self.height_calibration_scale > 0.0) {
            bail!(
                "height_calibration_scale must be positive, got {}",
                self.height_calibration_scale
            );
        }
        if !(self.optimal_knee_bend > 0.0) {
            bail!("optimal_knee_bend must be positive, got {}", self.optimal_knee_bend);
        }
        if self.velocity_calibration < 0.0 || self.force_calibration < 0.0 || self.contact_time_s < 0.0 {
            bail!("calibration constants must not be negative");
        }
        Ok(())
    }
}

/// アドバイス生成の閾値
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecommendationConfig {
    /// これ未満の跳躍高（cm）でパワー系のアドバイス
    #[serde(default = "default_low_height_cm")]
    pub low_height_cm: f64,
    #[serde(default = "default_low_symmetry")]
    pub low_symmetry: f64,
    #[serde(default = "default_low_technique")]
    pub low_technique: f64,
}

fn default_low_height_cm() -> f64 { 30.0 }
fn default_low_symmetry() -> f64 { 0.85 }
fn default_low_technique() -> f64 { 0.7 }

impl RecommendationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.low_height_cm.is_finite() && self.low_height_cm >= 0.0) {
            bail!("low_height_cm must be a non-negative number, got {}", self.low_height_cm);
        }
        for (name, value) in [
            ("low_symmetry", self.low_symmetry),
            ("low_technique", self.low_technique),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be in [0, 1], got {}", name, value);
            }
        }
        Ok(())
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            low_height_cm: default_low_height_cm(),
            low_symmetry: default_low_symmetry(),
            low_technique: default_low_technique(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.recommendations.validate()
    }

    /// 読み込みに失敗したらデフォルト設定を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Using default config ({}): {:#}",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.window_capacity, 300);
        assert_eq!(config.velocity_threshold, 0.15);
        assert_eq!(config.joint_confidence_threshold, 0.3);
        assert_eq!(config.height_calibration_scale, 200.0);
        assert_eq!(config.min_valid_frames, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            window_capacity = 120
            velocity_threshold = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.window_capacity, 120);
        assert_eq!(config.analysis.velocity_threshold, 0.5);
        assert_eq!(config.analysis.optimal_knee_bend, 90.0);
        assert_eq!(config.recommendations, RecommendationConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = AnalysisConfig {
            window_capacity: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_threshold() {
        let config = AnalysisConfig {
            velocity_threshold: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
        let config = AnalysisConfig {
            velocity_threshold: f64::NAN,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nheight_calibration_scale = 180.0\n[recommendations]\nlow_height_cm = 25.0").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.analysis.height_calibration_scale, 180.0);
        assert_eq!(config.recommendations.low_height_cm, 25.0);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nwindow_capacity = 0").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_recommendation_thresholds_validated() {
        assert!(RecommendationConfig::default().validate().is_ok());
        let advice = RecommendationConfig {
            low_symmetry: f64::NAN,
            ..RecommendationConfig::default()
        };
        assert!(advice.validate().is_err());
        let advice = RecommendationConfig {
            low_technique: 1.5,
            ..RecommendationConfig::default()
        };
        assert!(advice.validate().is_err());
        let advice = RecommendationConfig {
            low_height_cm: f64::INFINITY,
            ..RecommendationConfig::default()
        };
        assert!(advice.validate().is_err());
    }

    #[test]
    fn test_load_rejects_nan_recommendation_threshold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[recommendations]\nlow_symmetry = nan").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("low_symmetry"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }
}
