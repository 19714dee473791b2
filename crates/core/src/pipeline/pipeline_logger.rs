use std::collections::HashMap;
use std::time::Instant;

/// Observer for long-running verification stages (mainly video decoding).
///
/// Keeps the decoders free of any particular output mechanism: the CLI
/// logs through the `log` crate, tests and batch workers stay silent.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the frame count is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. hands per frame).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger backed by the `log` facade that aggregates per-stage timings and
/// metrics into a summary.
///
/// Progress lines are throttled to one every `throttle_frames` frames.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_seen: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Decode summary ({frames} frames, {:.1}s):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({} calls)",
                durations.len()
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    fn should_report(&self, current: usize, total: usize) -> bool {
        current % self.throttle_frames == 0 || (total > 0 && current == total)
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = current;
        if !self.should_report(current, total) {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Decoding: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Decoding: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::debug!("\n{text}");
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 0);
        logger.timing("track", 5.0);
        logger.metric("hands", 2.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timings_recorded_per_stage() {
        let mut logger = LogPipelineLogger::new(10);
        logger.timing("track", 20.0);
        logger.timing("track", 30.0);
        logger.timing("face", 5.0);

        assert_eq!(logger.timings_for("track").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("face").unwrap(), &[5.0]);
        assert!(logger.timings_for("ocr").is_none());
    }

    #[test]
    fn test_metrics_averaged_in_summary() {
        let mut logger = LogPipelineLogger::new(10);
        logger.progress(2, 0);
        logger.metric("hands", 1.0);
        logger.metric("hands", 2.0);

        assert_relative_eq!(mean(logger.metrics_for("hands").unwrap()), 1.5);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("hands: avg 1.5"));
        assert!(summary.contains("2 frames"));
    }

    #[test]
    fn test_summary_lists_stages_and_throughput() {
        let mut logger = LogPipelineLogger::new(10);
        logger.progress(100, 100);
        logger.timing("track", 10.0);
        logger.timing("face", 12.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("track"));
        assert!(summary.contains("face"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(LogPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_throttling() {
        let logger = LogPipelineLogger::new(10);
        assert!(logger.should_report(10, 0));
        assert!(!logger.should_report(11, 0));
        assert!(logger.should_report(13, 13));
        assert!(!logger.should_report(13, 0));
    }

    #[test]
    fn test_zero_throttle_clamped() {
        let logger = LogPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }
}
