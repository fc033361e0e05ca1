pub mod config;
pub mod error;
pub mod jump;
pub mod logging;
pub mod pose;

pub use config::{AnalysisConfig, Config, RecommendationConfig};
pub use error::{AnalysisError, ValidationError};
pub use jump::{analyze_source, FeedOutcome, JumpAnalysisResult, JumpAnalyzer, JumpPhase, PhaseKind};
pub use pose::{JointName, Keypoint, Pose, PoseFrame, PoseSource};
