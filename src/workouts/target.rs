//! Target power calculation.
//!
//! Turns a segment, the time spent in it and the rider's FTP into a watt target.
//! All rounding uses [`f64::round`] (half away from zero).

use crate::workouts::format::percent;
use crate::workouts::types::Segment;

/// Guards the progress division for zero-length segments.
const EPSILON: f64 = 1e-9;

/// Scale of the target bar relative to FTP.
const BAND_SPAN_FTP_FACTOR: f64 = 1.5;

/// Scale of the target bar in watts when no FTP is set.
const BAND_SPAN_DEFAULT_WATTS: f64 = 300.0;

/// Narrowest band drawn, in percent of the bar.
const BAND_MIN_WIDTH_PCT: f64 = 4.0;

/// Numeric target for the current point of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Watts at segment start
    pub start_w: i64,
    /// Watts at segment end
    pub end_w: i64,
    /// Interpolated watts at the current point
    pub current_w: i64,
    /// Segment start power in percent of FTP
    pub start_pct: i64,
    /// Segment end power in percent of FTP
    pub end_pct: i64,
}

impl Target {
    /// `"200-250 W (80%→100% FTP)"`, or `"225 W (90% FTP)"` for a flat target.
    pub fn range_label(&self) -> String {
        if self.start_w == self.end_w {
            format!("{} W ({}% FTP)", self.start_w, self.start_pct)
        } else {
            format!(
                "{}-{} W ({}%→{}% FTP)",
                self.start_w, self.end_w, self.start_pct, self.end_pct
            )
        }
    }

    /// `"225 W (90% FTP)"` for the current point.
    pub fn current_label(&self, ftp: u16) -> String {
        let pct = if ftp > 0 {
            (self.current_w as f64 / f64::from(ftp) * 100.0).round() as i64
        } else {
            0
        };
        format!("{} W ({}% FTP)", self.current_w, pct)
    }

    pub fn min_w(&self) -> i64 {
        self.start_w.min(self.end_w)
    }

    pub fn max_w(&self) -> i64 {
        self.start_w.max(self.end_w)
    }
}

/// Compute the target for `segment` after `elapsed_in_segment` seconds.
///
/// Returns `None` when there is no numeric target: FTP unset or a free ride.
pub fn compute_target(segment: &Segment, elapsed_in_segment: f64, ftp: u16) -> Option<Target> {
    if ftp == 0 {
        return None;
    }
    let range = segment.power?;

    let ftp = f64::from(ftp);
    let progress = (elapsed_in_segment / segment.duration_sec.max(EPSILON)).clamp(0.0, 1.0);
    let start_w = (range.start * ftp).round();
    let end_w = (range.end * ftp).round();
    let current_w = (start_w + (end_w - start_w) * progress).round();

    Some(Target {
        start_w: start_w as i64,
        end_w: end_w as i64,
        current_w: current_w as i64,
        start_pct: percent(range.start),
        end_pct: percent(range.end),
    })
}

/// Placement of the target band and the live power marker, in percent of the bar width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBand {
    /// Left edge of the target band
    pub left_pct: f64,
    /// Width of the target band
    pub width_pct: f64,
    /// Position of the live power marker
    pub actual_pct: f64,
    /// Whether the marker reflects a live reading (dimmed otherwise)
    pub actual_active: bool,
}

impl TargetBand {
    /// Lay out the band for `target`, with the live reading `actual` if any.
    pub fn layout(target: Option<&Target>, actual: Option<i16>, ftp: u16) -> Self {
        let span = if ftp > 0 {
            f64::from(ftp) * BAND_SPAN_FTP_FACTOR
        } else {
            BAND_SPAN_DEFAULT_WATTS
        };

        let (left_pct, width_pct) = match target {
            Some(target) if ftp > 0 => {
                let left = clamp_pct(target.min_w() as f64 / span * 100.0);
                let right = clamp_pct(target.max_w() as f64 / span * 100.0);
                (left, (right - left).max(BAND_MIN_WIDTH_PCT))
            }
            _ => (0.0, 100.0),
        };

        match actual {
            Some(watts) if ftp > 0 => Self {
                left_pct,
                width_pct,
                actual_pct: clamp_pct(f64::from(watts) / span * 100.0),
                actual_active: true,
            },
            _ => Self {
                left_pct,
                width_pct,
                actual_pct: if target.is_some() { left_pct } else { 0.0 },
                actual_active: false,
            },
        }
    }

    /// Whether the marker sits inside the band.
    pub fn actual_in_band(&self) -> bool {
        self.actual_active
            && self.actual_pct >= self.left_pct
            && self.actual_pct <= self.left_pct + self.width_pct
    }
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
