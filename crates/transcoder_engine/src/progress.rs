//! Parsers for the engine's machine-readable progress stream and its
//! human-readable diagnostic output.

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// One progress report: completion ratio in `[0, 1]` and elapsed engine time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTick {
    pub ratio: f64,
    pub elapsed_micros: i64,
}

/// Accumulates `key=value` records from `-progress` output.
///
/// A record ends with a `progress=continue` or `progress=end` line; that line
/// yields a tick.
#[derive(Debug, Default)]
pub struct ProgressParser {
    total_micros: Option<i64>,
    elapsed_micros: i64,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_micros(&self) -> Option<i64> {
        self.total_micros
    }

    /// Feed one diagnostic line; picks up the input duration when present.
    pub fn observe_diagnostic(&mut self, line: &str) {
        if self.total_micros.is_none() {
            self.total_micros = parse_duration_line(line);
        }
    }

    /// Feed one progress line.
    pub fn observe_progress(&mut self, line: &str) -> Option<ProgressTick> {
        let (key, value) = line.trim().split_once('=')?;
        match key.trim() {
            "out_time_us" | "out_time_ms" => {
                // Both keys carry microseconds.
                if let Ok(micros) = value.trim().parse::<i64>() {
                    self.elapsed_micros = micros.max(0);
                }
                None
            }
            "progress" => {
                let ratio = if value.trim() == "end" {
                    1.0
                } else {
                    self.ratio()
                };
                Some(ProgressTick {
                    ratio,
                    elapsed_micros: self.elapsed_micros,
                })
            }
            _ => None,
        }
    }

    fn ratio(&self) -> f64 {
        match self.total_micros {
            Some(total) if total > 0 => {
                (self.elapsed_micros as f64 / total as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Parses `Duration: HH:MM:SS.ff` from a diagnostic line into microseconds.
pub fn parse_duration_line(line: &str) -> Option<i64> {
    let start = line.find("Duration:")?;
    let value = line[start + "Duration:".len()..].trim_start();
    let end = value
        .find(|c: char| c == ',' || c.is_whitespace())
        .unwrap_or(value.len());
    parse_clock(&value[..end])
}

fn parse_clock(clock: &str) -> Option<i64> {
    let mut parts = clock.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let total = (hours * 3600.0 + minutes * 60.0 + seconds) * MICROS_PER_SECOND;
    Some(total.round() as i64)
}
