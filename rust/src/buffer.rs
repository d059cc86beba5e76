//! Root-sum-square buffer sizing and the buffer lifecycle.

use crate::config::BufferZoneThresholds;
use crate::models::{CriticalChainAnalysis, Minutes};

/// Half the Euclidean norm of per-task `(pessimistic - optimistic)` spreads,
/// rounded to whole minutes.
pub fn rss_buffer_minutes<I>(estimates: I) -> Minutes
where
    I: IntoIterator<Item = (Minutes, Minutes)>,
{
    let sum_of_squares: f64 = estimates
        .into_iter()
        .map(|(optimistic, pessimistic)| {
            let spread = (pessimistic - optimistic) as f64;
            spread * spread
        })
        .sum();
    (sum_of_squares.sqrt() / 2.0).round() as Minutes
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Project,
    Feeding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferStatus {
    Active,
    Archived,
}

/// Fever-chart zone derived from buffer penetration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferZone {
    Green,
    Yellow,
    Red,
}

/// A time buffer protecting the project end or a feeding-chain merge point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    pub kind: BufferKind,
    /// Merge task for feeding buffers.
    pub merge_task_id: Option<String>,
    pub size_minutes: Minutes,
    /// Updated by the owner of the buffer as work slips.
    pub consumed_minutes: Minutes,
    pub status: BufferStatus,
}

impl Buffer {
    pub fn project(size_minutes: Minutes) -> Self {
        Self {
            kind: BufferKind::Project,
            merge_task_id: None,
            size_minutes,
            consumed_minutes: 0,
            status: BufferStatus::Active,
        }
    }

    pub fn feeding(merge_task_id: impl Into<String>, size_minutes: Minutes) -> Self {
        Self {
            kind: BufferKind::Feeding,
            merge_task_id: Some(merge_task_id.into()),
            size_minutes,
            consumed_minutes: 0,
            status: BufferStatus::Active,
        }
    }

    /// `consumed / size`; zero-size buffers are fully penetrated as soon as
    /// anything is consumed.
    pub fn penetration(&self) -> f64 {
        if self.size_minutes <= 0 {
            return if self.consumed_minutes > 0 { f64::INFINITY } else { 0.0 };
        }
        self.consumed_minutes as f64 / self.size_minutes as f64
    }

    pub fn zone(&self, thresholds: &BufferZoneThresholds) -> BufferZone {
        let ratio = self.penetration();
        if ratio >= thresholds.red {
            BufferZone::Red
        } else if ratio >= thresholds.yellow {
            BufferZone::Yellow
        } else {
            BufferZone::Green
        }
    }

    pub fn consume(&mut self, minutes: Minutes) {
        self.consumed_minutes += minutes;
    }

    pub fn is_active(&self) -> bool {
        self.status == BufferStatus::Active
    }
}

/// Fresh buffers for an analysis: the project buffer first, then one feeding
/// buffer per feeding chain.
pub fn buffers_for(analysis: &CriticalChainAnalysis) -> Vec<Buffer> {
    std::iter::once(Buffer::project(analysis.project_buffer_minutes))
        .chain(
            analysis
                .feeding_buffers
                .iter()
                .map(|fb| Buffer::feeding(fb.merge_task_id.clone(), fb.buffer_minutes)),
        )
        .collect()
}

/// Archive every active buffer in `previous` and append fresh ones sized from
/// `analysis`, all with nothing consumed.
pub fn regenerate_buffers(mut previous: Vec<Buffer>, analysis: &CriticalChainAnalysis) -> Vec<Buffer> {
    for buffer in previous.iter_mut().filter(|b| b.is_active()) {
        buffer.status = BufferStatus::Archived;
    }
    previous.extend(buffers_for(analysis));
    previous
}
