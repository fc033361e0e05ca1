pub mod frame;
pub mod keypoint;
pub mod source;

pub use frame::PoseFrame;
pub use keypoint::{JointName, Keypoint, Pose};
pub use source::{FrameIter, JsonLinesSource, PoseSource};
