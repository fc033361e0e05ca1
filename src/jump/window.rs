use std::collections::VecDeque;

use super::kinematics::DerivedPose;
use super::phase::PhaseKind;

/// 固定容量のフレーム履歴（FIFO）
///
/// 容量に達したら最も古いフレームを捨てる。変更は `append` のみ。
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    entries: VecDeque<DerivedPose>,
    capacity: usize,
}

impl WindowBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加する。溢れた場合は追い出したフレームを返す
    pub fn append(&mut self, pose: DerivedPose) -> Option<DerivedPose> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(pose);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 古い順
    pub fn iter(&self) -> impl Iterator<Item = &DerivedPose> + '_ {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&DerivedPose> {
        self.entries.back()
    }

    /// 指定位相のフレームのみ
    pub fn in_phase(&self, phase: PhaseKind) -> impl Iterator<Item = &DerivedPose> + '_ {
        self.entries.iter().filter(move |p| p.phase == phase)
    }

    /// 信号の最大値。信号を持つフレームがなければ `None`
    pub fn max_by<F>(&self, signal: F) -> Option<f64>
    where
        F: Fn(&DerivedPose) -> Option<f64>,
    {
        max_value(self.entries.iter().filter_map(signal))
    }

    pub fn min_by<F>(&self, signal: F) -> Option<f64>
    where
        F: Fn(&DerivedPose) -> Option<f64>,
    {
        min_value(self.entries.iter().filter_map(signal))
    }

    /// 腰高さを持つフレーム数
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|p| p.hip_height.is_some()).count()
    }
}

pub(crate) fn max_value(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

pub(crate) fn min_value(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}
