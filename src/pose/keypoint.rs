use serde::{Deserialize, Serialize};

/// MoveNet の 17 キーポイント（インデックス順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum JointName {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl JointName {
    pub const COUNT: usize = 17;

    pub const ALL: [JointName; JointName::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// 単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0, 下が正)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値を超えていて、座標が有限か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence > threshold && self.x.is_finite() && self.y.is_finite()
    }

    /// 座標・信頼度がすべて [0, 1] に収まっているか（NaNは範囲外）
    pub fn in_unit_range(&self) -> bool {
        [self.x, self.y, self.confidence]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// 17キーポイントからなる姿勢
///
/// 検出されなかった関節は信頼度0のキーポイントとして保持する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub keypoints: [Keypoint; JointName::COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; JointName::COUNT]) -> Self {
        Self { keypoints }
    }

    /// 関節名でキーポイントを取得（信頼度を問わない）
    pub fn get(&self, joint: JointName) -> &Keypoint {
        &self.keypoints[joint as usize]
    }

    pub fn set(&mut self, joint: JointName, keypoint: Keypoint) {
        self.keypoints[joint as usize] = keypoint;
    }

    /// 範囲外の値を持つ最初の関節
    pub fn first_out_of_range(&self) -> Option<(JointName, &Keypoint)> {
        JointName::ALL
            .iter()
            .map(|&joint| (joint, self.get(joint)))
            .find(|(_, kp)| !kp.in_unit_range())
    }

    /// 信頼度が閾値を超えている場合のみキーポイントを返す
    pub fn joint(&self, joint: JointName, threshold: f32) -> Option<&Keypoint> {
        let kp = self.get(joint);
        kp.is_valid(threshold).then_some(kp)
    }

    /// 左右ペアが両方とも閾値を超えている場合のみ返す
    pub fn pair(
        &self,
        left: JointName,
        right: JointName,
        threshold: f32,
    ) -> Option<(&Keypoint, &Keypoint)> {
        Some((self.joint(left, threshold)?, self.joint(right, threshold)?))
    }
}
