//! Pose sources feeding the jump analyzer.
//!
//! The analyzer never talks to a detector directly; anything that yields
//! time-ordered `PoseFrame`s can drive a session.

use anyhow::{Context, Result};
use std::io::BufRead;

use super::frame::PoseFrame;

/// 時系列順に `PoseFrame` を生成するもの
pub trait PoseSource {
    /// 次のフレームを返す。ストリーム終端なら `Ok(None)`
    fn next_frame(&mut self) -> Result<Option<PoseFrame>>;
}

/// 任意のイテレータを `PoseSource` として扱うアダプタ
pub struct FrameIter<I> {
    inner: I,
}

impl<I> FrameIter<I>
where
    I: Iterator<Item = PoseFrame>,
{
    pub fn new<T>(frames: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            inner: frames.into_iter(),
        }
    }
}

impl<I> PoseSource for FrameIter<I>
where
    I: Iterator<Item = PoseFrame>,
{
    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        Ok(self.inner.next())
    }
}

/// 1行1フレームのJSON Linesを再生する
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> PoseSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .with_context(|| format!("Failed to read pose line {}", self.line_number + 1))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame = serde_json::from_str(trimmed)
                .with_context(|| format!("Invalid pose frame on line {}", self.line_number))?;
            return Ok(Some(frame));
        }
    }
}
