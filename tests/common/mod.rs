#![allow(dead_code)]

use talava_jump::{JointName, Keypoint, PoseFrame};

pub const FPS: f64 = 30.0;

/// 腰高さ(cm, スケール200)から画像y座標へ
pub fn hip_y(height_cm: f64) -> f32 {
    (1.0 - height_cm / 200.0) as f32
}

/// 全身がはっきり映っているフレーム
///
/// 肩は腰の0.25上、膝は0.2下（少し前に出して屈曲）、足首は0.4下。
/// 座標が [0, 1] に収まるのは腰高さ 70〜150cm の範囲。
pub fn body_frame(timestamp: f64, height_cm: f64) -> PoseFrame {
    use JointName::*;
    let y = hip_y(height_cm);
    PoseFrame::from_joints(
        timestamp,
        [
            (LeftShoulder, Keypoint::new(0.44, y - 0.25, 0.9)),
            (RightShoulder, Keypoint::new(0.56, y - 0.25, 0.9)),
            (LeftHip, Keypoint::new(0.45, y, 0.9)),
            (RightHip, Keypoint::new(0.55, y, 0.9)),
            (LeftKnee, Keypoint::new(0.40, y + 0.2, 0.9)),
            (RightKnee, Keypoint::new(0.50, y + 0.2, 0.9)),
            (LeftAnkle, Keypoint::new(0.45, y + 0.4, 0.9)),
            (RightAnkle, Keypoint::new(0.55, y + 0.4, 0.9)),
        ],
    )
}

/// 100cm → 130cm → 100cm を1秒で（30fps）、前後に静止区間
pub fn jump_heights() -> Vec<f64> {
    let mut heights = vec![100.0; 10];
    heights.extend((1..=15).map(|i| 100.0 + i as f64 * 2.0));
    heights.extend((1..=15).map(|i| 130.0 - i as f64 * 2.0));
    heights.extend(std::iter::repeat(100.0).take(10));
    heights
}

pub fn frames_from_heights(heights: &[f64]) -> Vec<PoseFrame> {
    heights
        .iter()
        .enumerate()
        .map(|(i, &h)| body_frame(i as f64 / FPS, h))
        .collect()
}

pub fn jump_frames() -> Vec<PoseFrame> {
    frames_from_heights(&jump_heights())
}
