//! Piecewise real-time to musical-time mapping.
//!
//! A [`TempoMap`] is a chain of segments, each covering a span of musical
//! time at a constant tempo ratio or under a linear ramp between two ratios.
//! `to_musical` and `to_real` are exact inverses inside the mapped range and
//! clamp outside it.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TempoSegment {
    Constant { musical: f64, ratio: f64 },
    /// Ratio moves linearly from `from` to `to` with real-time progress.
    Ramp { musical: f64, from: f64, to: f64 },
}

impl TempoSegment {
    pub fn musical_len(&self) -> f64 {
        match *self {
            TempoSegment::Constant { musical, .. } | TempoSegment::Ramp { musical, .. } => musical,
        }
    }

    pub fn real_len(&self) -> f64 {
        match *self {
            TempoSegment::Constant { musical, ratio } => musical / ratio,
            TempoSegment::Ramp { musical, from, to } => musical / ((from + to) / 2.0),
        }
    }

    /// Musical offset reached `real` seconds into the segment.
    fn musical_at(&self, real: f64) -> f64 {
        match *self {
            TempoSegment::Constant { ratio, .. } => real * ratio,
            TempoSegment::Ramp { musical, from, to } => {
                let p = (real / self.real_len()).clamp(0.0, 1.0);
                let average = (from + to) / 2.0;
                musical * (from * p + (to - from) * p * p / 2.0) / average
            }
        }
    }

    /// Real offset at which the segment reaches musical offset `musical_offset`.
    fn real_at(&self, musical_offset: f64) -> f64 {
        match *self {
            TempoSegment::Constant { ratio, .. } => musical_offset / ratio,
            TempoSegment::Ramp { musical, from, to } => {
                // from·p + (to - from)·p²/2 = q, solved for p in [0, 1]
                let q = (musical_offset / musical).clamp(0.0, 1.0) * (from + to) / 2.0;
                let a = (to - from) / 2.0;
                let disc = (from * from + 4.0 * a * q).max(0.0);
                let p = 2.0 * q / (from + disc.sqrt());
                p.clamp(0.0, 1.0) * self.real_len()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = match *self {
            TempoSegment::Constant { musical, ratio } => musical >= 0.0 && ratio > 0.0,
            TempoSegment::Ramp { musical, from, to } => musical >= 0.0 && from > 0.0 && to > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!("invalid tempo segment {self:?}")))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    musical_start: f64,
    segments: Vec<TempoSegment>,
}

impl TempoMap {
    /// Empty map whose first segment begins at `musical_start`.
    pub fn starting_at(musical_start: f64) -> Self {
        Self {
            musical_start,
            segments: Vec::new(),
        }
    }

    pub fn constant(mut self, musical: f64, ratio: f64) -> Self {
        self.segments.push(TempoSegment::Constant { musical, ratio });
        self
    }

    pub fn ramp(mut self, musical: f64, from: f64, to: f64) -> Self {
        self.segments.push(TempoSegment::Ramp { musical, from, to });
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.segments.iter().try_for_each(TempoSegment::validate)
    }

    pub fn segments(&self) -> &[TempoSegment] {
        &self.segments
    }

    pub fn musical_start(&self) -> f64 {
        self.musical_start
    }

    pub fn musical_end(&self) -> f64 {
        self.musical_start + self.segments.iter().map(TempoSegment::musical_len).sum::<f64>()
    }

    pub fn real_duration(&self) -> f64 {
        self.segments.iter().map(TempoSegment::real_len).sum()
    }

    /// Musical position `real` seconds after the start of the map.
    pub fn to_musical(&self, real: f64) -> f64 {
        if real <= 0.0 {
            return self.musical_start;
        }
        let mut real_left = real;
        let mut musical = self.musical_start;
        for segment in &self.segments {
            let len = segment.real_len();
            if real_left < len {
                return musical + segment.musical_at(real_left);
            }
            real_left -= len;
            musical += segment.musical_len();
        }
        musical
    }

    /// Real seconds from the start of the map to musical position `musical`.
    pub fn to_real(&self, musical: f64) -> f64 {
        let mut musical_left = musical - self.musical_start;
        if musical_left <= 0.0 {
            return 0.0;
        }
        let mut real = 0.0;
        for segment in &self.segments {
            let len = segment.musical_len();
            if musical_left < len {
                return real + segment.real_at(musical_left);
            }
            musical_left -= len;
            real += segment.real_len();
        }
        real
    }
}

/// Sections keyed by starting bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMap {
    bar_secs: f64,
    total_bars: u32,
    /// 1-indexed starting bar of each section, ascending.
    starts: Vec<u32>,
}

impl SectionMap {
    pub fn new(bar_secs: f64, total_bars: u32, starts: Vec<u32>) -> Self {
        Self {
            bar_secs,
            total_bars,
            starts,
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Section containing musical position `musical`.
    pub fn section_at(&self, musical: f64) -> usize {
        let bar = ((musical / self.bar_secs).floor().max(0.0) as u32 + 1).clamp(1, self.total_bars);
        self.starts
            .iter()
            .rposition(|&start| bar >= start)
            .unwrap_or(0)
    }

    /// Progress through `section` at `musical`, clamped to `[0, 1]`.
    pub fn progress(&self, musical: f64, section: usize) -> f64 {
        let Some(&start_bar) = self.starts.get(section) else {
            return 0.0;
        };
        let start = (start_bar - 1) as f64 * self.bar_secs;
        let end = match self.starts.get(section + 1) {
            Some(&next) => (next - 1) as f64 * self.bar_secs,
            None => self.total_bars as f64 * self.bar_secs,
        };
        if end <= start {
            return 1.0;
        }
        ((musical - start) / (end - start)).clamp(0.0, 1.0)
    }

    pub fn locate(&self, musical: f64) -> (usize, f64) {
        let section = self.section_at(musical);
        (section, self.progress(musical, section))
    }
}
