//! Session controller: start / feed / stop / cancel.
//!
//! A `JumpAnalyzer` owns at most one `AnalysisSession`. It is not internally
//! synchronized; callers serialize access (one analyzer per user or
//! connection). `feed` never fails: bad frames come back as
//! `FeedOutcome::Rejected` and the session keeps going.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, Config, RecommendationConfig};
use crate::error::{AnalysisError, ValidationError};
use crate::pose::{PoseFrame, PoseSource};

use super::kinematics::SignalDeriver;
use super::metrics;
use super::phase::{JumpPhase, PhaseKind, PhaseStateMachine};
use super::recommend::recommendations;
use super::result::JumpAnalysisResult;
use super::validator::FrameValidator;
use super::window::WindowBuffer;

/// `feed` の結果
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// 受理してウィンドウに追加した
    Accepted { phase: PhaseKind, transitioned: bool },
    /// 検証で落とした（セッションは継続）
    Rejected(ValidationError),
    /// セッションが開始されていない
    Inactive,
}

/// UI向けのライブ状態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub phase: PhaseKind,
    /// 最初に受理したフレームからの経過時間（ストリーム時刻）
    pub elapsed_s: f64,
    pub buffered_frames: usize,
    pub valid_frames: usize,
    pub jump_started: bool,
    /// 直近フレームの腰高さ（cm）。腰が見えていなければ `None`
    pub hip_height_cm: Option<f64>,
}

/// 1回の跳躍解析の可変状態
pub struct AnalysisSession {
    validator: FrameValidator,
    deriver: SignalDeriver,
    buffer: WindowBuffer,
    machine: PhaseStateMachine,
    rejected: usize,
}

impl AnalysisSession {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            validator: FrameValidator::from_config(config),
            deriver: SignalDeriver::from_config(config),
            buffer: WindowBuffer::new(config.window_capacity),
            machine: PhaseStateMachine::from_config(config),
            rejected: 0,
        }
    }

    /// 検証 → 信号導出 → 位相判定 → バッファ追加
    pub fn feed(&mut self, frame: PoseFrame) -> FeedOutcome {
        let joints = match self.validator.check(&frame) {
            Ok(joints) => joints,
            Err(e) => {
                tracing::warn!("Dropping frame: {}", e);
                self.rejected += 1;
                return FeedOutcome::Rejected(e);
            }
        };
        if !joints.hips {
            tracing::debug!("t={:.3}: hips below confidence, no height signal", frame.timestamp);
        }

        let mut derived = self.deriver.derive(frame, joints);
        let transition = self.machine.observe(derived.timestamp(), derived.vertical_velocity);
        derived.phase = self.machine.current();
        let phase = derived.phase;
        self.buffer.append(derived);

        FeedOutcome::Accepted {
            phase,
            transitioned: transition.is_some(),
        }
    }

    pub fn current_phase(&self) -> PhaseKind {
        self.machine.current()
    }

    pub fn jump_start_time(&self) -> Option<f64> {
        self.machine.jump_start_time()
    }

    pub fn max_height_reached(&self) -> bool {
        self.machine.max_height_reached()
    }

    pub fn buffer(&self) -> &WindowBuffer {
        &self.buffer
    }

    pub fn rejected_frames(&self) -> usize {
        self.rejected
    }

    pub fn status(&self) -> SessionStatus {
        let elapsed_s = match (self.machine.first_timestamp(), self.machine.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        SessionStatus {
            phase: self.current_phase(),
            elapsed_s,
            buffered_frames: self.buffer.len(),
            valid_frames: self.buffer.valid_count(),
            jump_started: self.jump_start_time().is_some(),
            hip_height_cm: self.buffer.latest().and_then(|p| p.hip_height),
        }
    }

    /// 指標を計算して結果を組み立てる
    pub fn finish(
        self,
        config: &AnalysisConfig,
        advice: &RecommendationConfig,
    ) -> Result<JumpAnalysisResult, AnalysisError> {
        let jump_start = self
            .machine
            .jump_start_time()
            .ok_or(AnalysisError::NoJumpDetected)?;

        let valid = self.buffer.valid_count();
        if valid < config.min_valid_frames {
            return Err(AnalysisError::InsufficientFrames {
                valid,
                required: config.min_valid_frames,
            });
        }

        // 着地まで到達しなかった場合は最終フレームで打ち切る
        let landing = self
            .machine
            .landing_time()
            .or(self.machine.last_timestamp())
            .unwrap_or(jump_start);

        let threshold = config.joint_confidence_threshold;
        let max_height_cm = metrics::max_height_cm(&self.buffer);
        let symmetry_score = metrics::symmetry_score(&self.buffer, threshold);
        let technique_score =
            metrics::technique_score(&self.buffer, threshold, config.optimal_knee_bend);

        let phases = self
            .machine
            .spans()
            .into_iter()
            .map(|(name, start, end)| JumpPhase {
                name,
                start_timestamp: start,
                end_timestamp: end,
                key_metrics: metrics::phase_key_metrics(&self.buffer, name, start, end),
            })
            .collect();

        Ok(JumpAnalysisResult {
            max_height_cm,
            contact_time_s: config.contact_time_s,
            flight_time_s: metrics::flight_time_s(jump_start, landing),
            takeoff_velocity_mps: metrics::takeoff_velocity_mps(
                &self.buffer,
                config.velocity_calibration,
            ),
            landing_force_n: metrics::landing_force_n(&self.buffer, config.force_calibration),
            symmetry_score,
            technique_score,
            phases,
            recommendations: recommendations(max_height_cm, symmetry_score, technique_score, advice),
        })
    }
}

/// 跳躍解析のセッション管理
pub struct JumpAnalyzer {
    config: AnalysisConfig,
    advice: RecommendationConfig,
    session: Option<AnalysisSession>,
}

impl JumpAnalyzer {
    /// 設定を検証してから作る。不正な閾値では解析しない
    pub fn new(config: AnalysisConfig, advice: RecommendationConfig) -> Result<Self> {
        config.validate().context("Invalid analysis config")?;
        advice.validate().context("Invalid recommendation config")?;
        Ok(Self {
            config,
            advice,
            session: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.analysis.clone(), config.recommendations.clone())
    }

    /// 状態をリセットしてフレーム受付を開始する
    pub fn start(&mut self) {
        if self.session.is_some() {
            tracing::warn!("Restarting: discarding the running session");
        }
        tracing::info!(
            "Jump session started (window={}, v_threshold={})",
            self.config.window_capacity,
            self.config.velocity_threshold
        );
        self.session = Some(AnalysisSession::new(&self.config));
    }

    pub fn feed(&mut self, frame: PoseFrame) -> FeedOutcome {
        match self.session.as_mut() {
            Some(session) => session.feed(frame),
            None => {
                tracing::debug!("Frame at t={:.3} ignored: no active session", frame.timestamp);
                FeedOutcome::Inactive
            }
        }
    }

    /// 解析してセッションを破棄する
    pub fn stop(&mut self) -> Result<JumpAnalysisResult, AnalysisError> {
        let session = self.session.take().ok_or(AnalysisError::NotActive)?;
        let rejected = session.rejected_frames();
        let result = session.finish(&self.config, &self.advice);
        match &result {
            Ok(r) => tracing::info!(
                "Jump session stopped: height={:.1}cm flight={:.3}s phases={} (rejected frames: {})",
                r.max_height_cm,
                r.flight_time_s,
                r.phases.len(),
                rejected
            ),
            Err(e) => tracing::info!("Jump session stopped without result: {}", e),
        }
        result
    }

    /// 計算せずに破棄する。何度呼んでもよい
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("Jump session cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_phase(&self) -> Option<PhaseKind> {
        self.session.as_ref().map(AnalysisSession::current_phase)
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(AnalysisSession::status)
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

/// `PoseSource` を最後まで流して解析する
pub fn analyze_source<S: PoseSource + ?Sized>(
    source: &mut S,
    config: &Config,
) -> Result<JumpAnalysisResult> {
    let mut analyzer = JumpAnalyzer::from_config(config)?;
    analyzer.start();
    while let Some(frame) = source.next_frame()? {
        analyzer.feed(frame);
    }
    Ok(analyzer.stop()?)
}
