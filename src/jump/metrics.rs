//! Metric calculators run once when a session stops.
//!
//! All functions are pure scans over the retained window. Force and velocity
//! figures come from an uncalibrated full-frame height assumption and are
//! estimates, not measurements.

use std::collections::BTreeMap;

use crate::pose::{JointName, Keypoint, Pose};

use super::phase::PhaseKind;
use super::window::{max_value, min_value, WindowBuffer};

/// 対称性・技術スコアの対象フレームがない場合の中立値
pub const NEUTRAL_SCORE: f64 = 0.5;

/// 跳躍高 = 腰高さの最大 - 最小
pub fn max_height_cm(buffer: &WindowBuffer) -> f64 {
    match (buffer.max_by(|p| p.hip_height), buffer.min_by(|p| p.hip_height)) {
        (Some(max), Some(min)) => max - min,
        _ => 0.0,
    }
}

pub fn flight_time_s(jump_start_time: f64, landing_time: f64) -> f64 {
    (landing_time - jump_start_time).max(0.0)
}

/// Takeoff区間の最大速度 × 較正係数
pub fn takeoff_velocity_mps(buffer: &WindowBuffer, velocity_calibration: f64) -> f64 {
    max_value(buffer.in_phase(PhaseKind::Takeoff).filter_map(|p| p.vertical_velocity))
        .map_or(0.0, |v| v * velocity_calibration)
}

/// |Landing区間の最小速度| × 較正係数
///
/// 体重や床反力計の入力がないため推定値。
pub fn landing_force_n(buffer: &WindowBuffer, force_calibration: f64) -> f64 {
    min_value(buffer.in_phase(PhaseKind::Landing).filter_map(|p| p.vertical_velocity))
        .map_or(0.0, |v| v.abs() * force_calibration)
}

/// 1フレームの左右対称性: 肩・腰・膝ペアごとの (1 - |Δy|) の平均
pub fn frame_symmetry(pose: &Pose, threshold: f32) -> Option<f64> {
    use JointName::*;
    let pairs = [
        (LeftShoulder, RightShoulder),
        (LeftHip, RightHip),
        (LeftKnee, RightKnee),
    ];
    let mut sum = 0.0;
    for (left, right) in pairs {
        let (l, r) = pose.pair(left, right, threshold)?;
        sum += (1.0 - (l.y as f64 - r.y as f64).abs()).clamp(0.0, 1.0);
    }
    Some(sum / pairs.len() as f64)
}

pub fn symmetry_score(buffer: &WindowBuffer, threshold: f32) -> f64 {
    mean_or_neutral(
        buffer
            .iter()
            .filter(|p| p.joints.symmetry)
            .filter_map(|p| frame_symmetry(p.pose(), threshold)),
    )
}

/// 膝の屈曲角（度）: 180° - 腰・膝・足首のなす角
///
/// 線分の長さが0なら `None`。
pub fn knee_bend_degrees(hip: &Keypoint, knee: &Keypoint, ankle: &Keypoint) -> Option<f64> {
    let (ax, ay) = (hip.x as f64 - knee.x as f64, hip.y as f64 - knee.y as f64);
    let (bx, by) = (ankle.x as f64 - knee.x as f64, ankle.y as f64 - knee.y as f64);
    let len = (ax * ax + ay * ay).sqrt() * (bx * bx + by * by).sqrt();
    if len <= f64::EPSILON {
        return None;
    }
    let cos = ((ax * bx + ay * by) / len).clamp(-1.0, 1.0);
    Some(180.0 - cos.acos().to_degrees())
}

/// 左右で計算できた脚の屈曲角の平均
pub fn frame_knee_bend(pose: &Pose, threshold: f32) -> Option<f64> {
    use JointName::*;
    let leg = |hip: JointName, knee: JointName, ankle: JointName| -> Option<f64> {
        knee_bend_degrees(
            pose.joint(hip, threshold)?,
            pose.joint(knee, threshold)?,
            pose.joint(ankle, threshold)?,
        )
    };
    match (leg(LeftHip, LeftKnee, LeftAnkle), leg(RightHip, RightKnee, RightAnkle)) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(b), None) | (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// 1フレームの技術スコア: 1 - |実際の屈曲 - 理想| / 理想 を [0,1] に丸める
pub fn frame_technique(pose: &Pose, threshold: f32, optimal_knee_bend: f64) -> Option<f64> {
    // 理想角が正でなければ比率が定義できない
    if !(optimal_knee_bend > 0.0) {
        return None;
    }
    let bend = frame_knee_bend(pose, threshold)?;
    Some((1.0 - (bend - optimal_knee_bend).abs() / optimal_knee_bend).clamp(0.0, 1.0))
}

pub fn technique_score(buffer: &WindowBuffer, threshold: f32, optimal_knee_bend: f64) -> f64 {
    mean_or_neutral(
        buffer
            .iter()
            .filter(|p| p.joints.technique)
            .filter_map(|p| frame_technique(p.pose(), threshold, optimal_knee_bend)),
    )
}

fn mean_or_neutral(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        NEUTRAL_SCORE
    } else {
        (sum / count as f64).clamp(0.0, 1.0)
    }
}

/// 位相ごとの代表値
///
/// `duration_s` と `frames` は常に入る。速度・腰高さは信号のあるフレームがある場合のみ。
pub fn phase_key_metrics(
    buffer: &WindowBuffer,
    phase: PhaseKind,
    start: f64,
    end: f64,
) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();
    metrics.insert("duration_s".to_string(), (end - start).max(0.0));
    metrics.insert("frames".to_string(), buffer.in_phase(phase).count() as f64);

    let velocities = || buffer.in_phase(phase).filter_map(|p| p.vertical_velocity);
    let heights = || buffer.in_phase(phase).filter_map(|p| p.hip_height);
    let optional = [
        ("max_velocity", max_value(velocities())),
        ("min_velocity", min_value(velocities())),
        ("max_hip_height_cm", max_value(heights())),
        ("min_hip_height_cm", min_value(heights())),
    ];
    for (key, value) in optional {
        if let Some(v) = value {
            metrics.insert(key.to_string(), v);
        }
    }
    metrics
}
