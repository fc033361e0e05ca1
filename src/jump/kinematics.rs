use crate::config::AnalysisConfig;
use crate::pose::{JointName, Pose, PoseFrame};

use super::phase::PhaseKind;
use super::validator::JointAvailability;

/// 派生信号付きのフレーム
///
/// `hip_height` / `vertical_velocity` の `None` は「信号なし」であり、0（静止）とは区別する。
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPose {
    pub frame: PoseFrame,
    pub joints: JointAvailability,
    /// 腰高さ（cm相当）
    pub hip_height: Option<f64>,
    /// 腰の鉛直速度（cm/s相当, 上が正）
    pub vertical_velocity: Option<f64>,
    /// このフレームの遷移判定後の位相
    pub phase: PhaseKind,
}

impl DerivedPose {
    pub fn timestamp(&self) -> f64 {
        self.frame.timestamp
    }

    pub fn pose(&self) -> &Pose {
        &self.frame.pose
    }
}

/// 腰高さと鉛直速度の導出
pub struct SignalDeriver {
    /// 画面全高に相当する高さ（cm）
    calibration_scale: f64,
    confidence_threshold: f32,
    /// 直前に受理したフレームの (タイムスタンプ, 腰高さ)
    prev: Option<(f64, Option<f64>)>,
}

impl SignalDeriver {
    pub fn new(calibration_scale: f64, confidence_threshold: f32) -> Self {
        Self {
            calibration_scale,
            confidence_threshold,
            prev: None,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.height_calibration_scale, config.joint_confidence_threshold)
    }

    /// 腰高さ = (1 - 左右ヒップyの平均) * スケール
    ///
    /// 画像のyは下向きなので反転する。
    pub fn hip_height(&self, pose: &Pose) -> Option<f64> {
        let (left, right) = pose.pair(JointName::LeftHip, JointName::RightHip, self.confidence_threshold)?;
        let hip_y = (left.y as f64 + right.y as f64) / 2.0;
        Some((1.0 - hip_y) * self.calibration_scale)
    }

    /// 受理済みフレームから派生信号を計算する
    ///
    /// 速度は直前フレームと今回の両方に腰高さがあり、Δt > 0 のときだけ定義される。
    pub fn derive(&mut self, frame: PoseFrame, joints: JointAvailability) -> DerivedPose {
        let hip_height = if joints.hips {
            self.hip_height(&frame.pose)
        } else {
            None
        };

        let vertical_velocity = match (self.prev, hip_height) {
            (Some((prev_t, Some(prev_h))), Some(h)) => {
                let dt = frame.timestamp - prev_t;
                if dt > 0.0 {
                    Some((h - prev_h) / dt)
                } else {
                    None
                }
            }
            _ => None,
        };

        self.prev = Some((frame.timestamp, hip_height));

        DerivedPose {
            frame,
            joints,
            hip_height,
            vertical_velocity,
            phase: PhaseKind::Preparation,
        }
    }
}
