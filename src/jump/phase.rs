//! Single-jump phase detection.
//!
//! Preparation → Takeoff → Flight → Landing, driven only by vertical hip
//! velocity. Transitions never go backwards; Landing is terminal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Preparation,
    Takeoff,
    Flight,
    Landing,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 4] = [
        Self::Preparation,
        Self::Takeoff,
        Self::Flight,
        Self::Landing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparation => "preparation",
            Self::Takeoff => "takeoff",
            Self::Flight => "flight",
            Self::Landing => "landing",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解析結果に含まれる位相区間
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpPhase {
    pub name: PhaseKind,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    pub key_metrics: BTreeMap<String, f64>,
}

/// 速度閾値による位相の状態機械
pub struct PhaseStateMachine {
    velocity_threshold: f64,
    current: PhaseKind,
    /// 各位相の開始時刻（入った順）
    starts: Vec<(PhaseKind, f64)>,
    last_timestamp: Option<f64>,
    jump_start_time: Option<f64>,
    landing_time: Option<f64>,
    max_height_reached: bool,
}

impl PhaseStateMachine {
    pub fn new(velocity_threshold: f64) -> Self {
        Self {
            velocity_threshold,
            current: PhaseKind::Preparation,
            starts: Vec::with_capacity(PhaseKind::ALL.len()),
            last_timestamp: None,
            jump_start_time: None,
            landing_time: None,
            max_height_reached: false,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.velocity_threshold)
    }

    /// 受理したフレームごとに呼ぶ。位相が変わったら新しい位相を返す
    ///
    /// 速度が未定義のフレームは遷移を起こさない。
    pub fn observe(&mut self, timestamp: f64, velocity: Option<f64>) -> Option<PhaseKind> {
        if self.starts.is_empty() {
            self.starts.push((PhaseKind::Preparation, timestamp));
        }
        self.last_timestamp = Some(timestamp);

        let v = velocity?;
        let th = self.velocity_threshold;
        let next = match self.current {
            PhaseKind::Preparation if v > th => {
                self.jump_start_time = Some(timestamp);
                PhaseKind::Takeoff
            }
            // 頂点通過
            PhaseKind::Takeoff if v < -th => {
                self.max_height_reached = true;
                PhaseKind::Flight
            }
            // 頂点付近の停滞でも成立しうる（既知の制約）
            PhaseKind::Flight if self.max_height_reached && v.abs() < th => {
                self.landing_time = Some(timestamp);
                PhaseKind::Landing
            }
            _ => return None,
        };

        tracing::info!("phase {} -> {} at t={:.3} (v={:.3})", self.current, next, timestamp, v);
        self.current = next;
        self.starts.push((next, timestamp));
        Some(next)
    }

    pub fn current(&self) -> PhaseKind {
        self.current
    }

    pub fn jump_start_time(&self) -> Option<f64> {
        self.jump_start_time
    }

    pub fn landing_time(&self) -> Option<f64> {
        self.landing_time
    }

    pub fn max_height_reached(&self) -> bool {
        self.max_height_reached
    }

    pub fn first_timestamp(&self) -> Option<f64> {
        self.starts.first().map(|&(_, t)| t)
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// 入った位相の区間 `(位相, 開始, 終了)`。最後の位相は最終フレームで閉じる
    pub fn spans(&self) -> Vec<(PhaseKind, f64, f64)> {
        let end_of_stream = self.last_timestamp.unwrap_or(0.0);
        self.starts
            .iter()
            .enumerate()
            .map(|(i, &(kind, start))| {
                let end = self
                    .starts
                    .get(i + 1)
                    .map_or(end_of_stream, |&(_, next_start)| next_start);
                (kind, start, end)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(machine: &mut PhaseStateMachine, velocities: &[Option<f64>]) {
        for (i, v) in velocities.iter().enumerate() {
            machine.observe(i as f64 * 0.1, *v);
        }
    }

    #[test]
    fn test_starts_in_preparation() {
        let machine = PhaseStateMachine::new(0.15);
        assert_eq!(machine.current(), PhaseKind::Preparation);
        assert!(machine.spans().is_empty());
        assert!(!machine.max_height_reached());
    }

    #[test]
    fn test_full_sequence() {
        let mut m = PhaseStateMachine::new(0.15);
        assert_eq!(m.observe(0.0, None), None);
        assert_eq!(m.observe(0.1, Some(0.0)), None);
        assert_eq!(m.observe(0.2, Some(1.0)), Some(PhaseKind::Takeoff));
        assert_eq!(m.jump_start_time(), Some(0.2));
        assert_eq!(m.observe(0.3, Some(0.5)), None);
        assert_eq!(m.observe(0.4, Some(-1.0)), Some(PhaseKind::Flight));
        assert!(m.max_height_reached());
        assert_eq!(m.observe(0.5, Some(-1.0)), None);
        assert_eq!(m.observe(0.6, Some(0.01)), Some(PhaseKind::Landing));
        assert_eq!(m.landing_time(), Some(0.6));
        assert_eq!(m.observe(0.7, Some(5.0)), None);

        let spans = m.spans();
        assert_eq!(
            spans,
            vec![
                (PhaseKind::Preparation, 0.0, 0.2),
                (PhaseKind::Takeoff, 0.2, 0.4),
                (PhaseKind::Flight, 0.4, 0.6),
                (PhaseKind::Landing, 0.6, 0.7),
            ]
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut m = PhaseStateMachine::new(0.15);
        run(&mut m, &[Some(0.15), Some(0.15)]);
        assert_eq!(m.current(), PhaseKind::Preparation);
    }

    #[test]
    fn test_undefined_velocity_never_transitions() {
        let mut m = PhaseStateMachine::new(0.15);
        run(&mut m, &[None, None, None]);
        assert_eq!(m.current(), PhaseKind::Preparation);
        assert_eq!(m.jump_start_time(), None);
    }

    #[test]
    fn test_no_skip_from_preparation() {
        let mut m = PhaseStateMachine::new(0.15);
        // 下降や静止ではTakeoffを経由せずにFlight/Landingへ行かない
        run(&mut m, &[Some(-2.0), Some(0.0), Some(-2.0), Some(0.0)]);
        assert_eq!(m.current(), PhaseKind::Preparation);
    }

    #[test]
    fn test_takeoff_holds_through_apex_plateau() {
        let mut m = PhaseStateMachine::new(0.15);
        run(&mut m, &[Some(1.0), Some(0.0), Some(0.0)]);
        assert_eq!(m.current(), PhaseKind::Takeoff);
    }

    #[test]
    fn test_landing_fires_on_plateau_right_after_apex() {
        // |v| < 閾値 の判定は着地ではなく頂点付近の停滞でも成立する
        let mut m = PhaseStateMachine::new(0.15);
        run(&mut m, &[Some(1.0), Some(-0.2), Some(0.05)]);
        assert_eq!(m.current(), PhaseKind::Landing);
    }

    #[test]
    fn test_no_regression_after_landing() {
        let mut m = PhaseStateMachine::new(0.15);
        run(&mut m, &[Some(1.0), Some(-1.0), Some(0.0), Some(1.0), Some(-1.0)]);
        assert_eq!(m.current(), PhaseKind::Landing);
        assert_eq!(m.spans().len(), 4);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(PhaseKind::Takeoff.to_string(), "takeoff");
        assert_eq!(format!("{}", PhaseKind::Landing), "landing");
    }
}
