use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::keypoint::{JointName, Keypoint, Pose};

/// タイムスタンプ付きの1フレーム分の姿勢
///
/// ワイヤ形式は `{ "timestamp": 1.25, "joints": { "left_hip": { "x", "y", "confidence" } } }`。
/// `joints` に含まれない関節は信頼度0として扱う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FrameRecord", into = "FrameRecord")]
pub struct PoseFrame {
    /// 単調増加する秒単位のタイムスタンプ
    pub timestamp: f64,
    pub pose: Pose,
}

impl PoseFrame {
    pub fn new(timestamp: f64, pose: Pose) -> Self {
        Self { timestamp, pose }
    }

    /// 関節マップから作成
    pub fn from_joints<I>(timestamp: f64, joints: I) -> Self
    where
        I: IntoIterator<Item = (JointName, Keypoint)>,
    {
        let mut pose = Pose::default();
        for (joint, keypoint) in joints {
            pose.set(joint, keypoint);
        }
        Self { timestamp, pose }
    }
}

#[derive(Serialize, Deserialize)]
struct FrameRecord {
    timestamp: f64,
    #[serde(default)]
    joints: BTreeMap<JointName, Keypoint>,
}

impl From<FrameRecord> for PoseFrame {
    fn from(record: FrameRecord) -> Self {
        PoseFrame::from_joints(record.timestamp, record.joints)
    }
}

impl From<PoseFrame> for FrameRecord {
    fn from(frame: PoseFrame) -> Self {
        // 未検出（信頼度0）の関節は書き出さない
        let joints = JointName::ALL
            .iter()
            .map(|&joint| (joint, *frame.pose.get(joint)))
            .filter(|(_, kp)| kp.confidence > 0.0)
            .collect();
        Self {
            timestamp: frame.timestamp,
            joints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{
            "timestamp": 1.5,
            "joints": {
                "left_hip": { "x": 0.45, "y": 0.6, "confidence": 0.9 },
                "right_hip": { "x": 0.55, "y": 0.62, "confidence": 0.8 }
            }
        }"#;
        let frame: PoseFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.timestamp, 1.5);
        assert_eq!(frame.pose.get(JointName::LeftHip).y, 0.6);
        assert_eq!(frame.pose.get(JointName::RightHip).confidence, 0.8);
        assert_eq!(frame.pose.get(JointName::Nose).confidence, 0.0);
    }

    #[test]
    fn test_missing_joints_field_is_empty_pose() {
        let frame: PoseFrame = serde_json::from_str(r#"{ "timestamp": 0.1 }"#).unwrap();
        assert_eq!(frame.pose, Pose::default());
    }

    #[test]
    fn test_unknown_joint_is_rejected() {
        let json = r#"{ "timestamp": 0.1, "joints": { "tail": { "x": 0.1, "y": 0.1, "confidence": 1.0 } } }"#;
        assert!(serde_json::from_str::<PoseFrame>(json).is_err());
    }

    #[test]
    fn test_serialize_omits_undetected_joints() {
        let frame = PoseFrame::from_joints(2.0, [(JointName::LeftKnee, Keypoint::new(0.4, 0.7, 0.9))]);
        let value = serde_json::to_value(&frame).unwrap();
        let joints = value["joints"].as_object().unwrap();
        assert_eq!(joints.len(), 1);
        assert!(joints.contains_key("left_knee"));
    }
}
