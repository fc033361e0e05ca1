pub mod kinematics;
pub mod metrics;
pub mod phase;
pub mod recommend;
pub mod result;
pub mod session;
pub mod validator;
pub mod window;

pub use kinematics::{DerivedPose, SignalDeriver};
pub use phase::{JumpPhase, PhaseKind, PhaseStateMachine};
pub use recommend::recommendations;
pub use result::JumpAnalysisResult;
pub use session::{analyze_source, AnalysisSession, FeedOutcome, JumpAnalyzer, SessionStatus};
pub use validator::{FrameValidator, JointAvailability};
pub use window::WindowBuffer;
