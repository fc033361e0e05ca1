use crate::config::AnalysisConfig;
use crate::error::ValidationError;
use crate::pose::{JointName, Pose, PoseFrame};

/// どの派生信号に寄与できるか（信頼度チェック結果）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JointAvailability {
    /// 左右ヒップ → 腰高さ
    pub hips: bool,
    /// 左右の肩・腰・膝 → 対称性
    pub symmetry: bool,
    /// 少なくとも片脚の腰・膝・足首 → 技術スコア
    pub technique: bool,
}

/// フレームの検証
///
/// タイムスタンプは直前に受理したフレームより厳密に大きくなければならない。
/// 座標・信頼度が [0, 1] を外れたキーポイントを含むフレームは落とす。
/// 関節の信頼度不足はエラーではなく、`JointAvailability` で表す。
pub struct FrameValidator {
    confidence_threshold: f32,
    last_timestamp: Option<f64>,
}

impl FrameValidator {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            last_timestamp: None,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.joint_confidence_threshold)
    }

    /// フレームを検証し、受理したら最終タイムスタンプを更新する
    pub fn check(&mut self, frame: &PoseFrame) -> Result<JointAvailability, ValidationError> {
        if !frame.timestamp.is_finite() {
            return Err(ValidationError::NonFiniteTimestamp(frame.timestamp));
        }
        if let Some(last) = self.last_timestamp {
            if frame.timestamp <= last {
                return Err(ValidationError::NonMonotonicTimestamp {
                    timestamp: frame.timestamp,
                    last,
                });
            }
        }
        if let Some((joint, kp)) = frame.pose.first_out_of_range() {
            return Err(ValidationError::KeypointOutOfRange {
                joint,
                x: kp.x,
                y: kp.y,
                confidence: kp.confidence,
            });
        }
        self.last_timestamp = Some(frame.timestamp);
        Ok(self.availability(&frame.pose))
    }

    pub fn availability(&self, pose: &Pose) -> JointAvailability {
        use JointName::*;
        let t = self.confidence_threshold;

        let hips = pose.pair(LeftHip, RightHip, t).is_some();
        let symmetry = hips
            && pose.pair(LeftShoulder, RightShoulder, t).is_some()
            && pose.pair(LeftKnee, RightKnee, t).is_some();
        let leg = |hip: JointName, knee: JointName, ankle: JointName| {
            pose.joint(hip, t).is_some()
                && pose.joint(knee, t).is_some()
                && pose.joint(ankle, t).is_some()
        };
        let technique = leg(LeftHip, LeftKnee, LeftAnkle) || leg(RightHip, RightKnee, RightAnkle);

        JointAvailability {
            hips,
            symmetry,
            technique,
        }
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}
