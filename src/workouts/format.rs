//! Text helpers shared by the library listing, the player view and the CLI.

use crate::workouts::types::Segment;

/// Percentage of a power fraction, rounded half away from zero (`0.905` → `91`).
pub fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Format seconds as `mm:ss`. Minutes are floored, seconds rounded.
pub fn format_time(total_seconds: f64) -> String {
    let total_seconds = total_seconds.max(0.0);
    let minutes = (total_seconds / 60.0).floor() as u64;
    let seconds = (total_seconds % 60.0).round() as u64;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Relative power description of a segment.
pub fn power_text(segment: &Segment) -> String {
    match segment.power {
        None => "Ride at your choice (ERG off)".to_string(),
        Some(range) => {
            let start = percent(range.start);
            let end = percent(range.end);
            if start == end {
                format!("{}% FTP", start)
            } else {
                format!("{}% → {}% FTP", start, end)
            }
        }
    }
}

/// Power description with watts when an FTP is known.
///
/// Used by the library listing, where no clock is running.
pub fn target_text(segment: &Segment, ftp: u16) -> String {
    let Some(range) = segment.power else {
        return "Free ride / ERG off".to_string();
    };

    let start_pct = percent(range.start);
    let end_pct = percent(range.end);
    let ftp = f64::from(ftp);
    let start_w = (range.start * ftp).round() as i64;
    let end_w = (range.end * ftp).round() as i64;

    if start_pct == end_pct {
        return if ftp > 0.0 {
            format!("{} W ({}% FTP)", start_w, start_pct)
        } else {
            format!("{}% FTP", start_pct)
        };
    }

    let pct_text = format!("{}% → {}% FTP", start_pct, end_pct);
    if ftp > 0.0 {
        format!("{}-{} W ({})", start_w, end_w, pct_text)
    } else {
        pct_text
    }
}

/// Zone color for a power fraction.
pub fn power_color(fraction: f64) -> &'static str {
    if fraction < 0.6 {
        "#22c55e"
    } else if fraction < 0.8 {
        "#10b981"
    } else if fraction < 1.0 {
        "#2563eb"
    } else if fraction < 1.2 {
        "#f59e0b"
    } else {
        "#ef4444"
    }
}

/// Colors at the start and end of a segment bar. Fractions are clamped to
/// 0-140% first; free rides get a neutral grey pair.
pub fn bar_colors(segment: &Segment) -> (&'static str, &'static str) {
    match segment.power {
        None => ("#94a3b8", "#cbd5e1"),
        Some(range) => (
            power_color(range.start.clamp(0.0, 1.4)),
            power_color(range.end.clamp(0.0, 1.4)),
        ),
    }
}
