use chrono::{DateTime, Duration, Utc};

/// Raw viewport measurements reported by the scroll listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    /// Percentage of the document seen so far, clamped to 0..=100.
    /// `None` when the document has no measurable height.
    pub fn percent(&self) -> Option<i32> {
        if self.document_height.is_nan() || self.document_height <= 0.0 {
            return None;
        }
        let pct = (self.scroll_top + self.viewport_height) / self.document_height * 100.0;
        if !pct.is_finite() {
            return None;
        }
        Some(pct.round().clamp(0.0, 100.0) as i32)
    }
}

/// Running maximum scroll depth for the open page view.
///
/// Samples arriving inside the throttle window are not committed immediately;
/// the deepest of them is held back and folded in on the next accepted sample
/// or when the page view closes, so throttling never lowers the final depth.
#[derive(Debug, Clone)]
pub struct ScrollDepth {
    interval: Duration,
    max: i32,
    held: Option<i32>,
    last_accepted: Option<DateTime<Utc>>,
}

impl ScrollDepth {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval: Duration::from_std(interval).unwrap_or_else(|_| Duration::zero()),
            max: 0,
            held: None,
            last_accepted: None,
        }
    }

    /// Returns true when the sample was committed rather than held back.
    pub fn observe(&mut self, percent: i32, at: DateTime<Utc>) -> bool {
        let percent = percent.clamp(0, 100);
        let throttled = self
            .last_accepted
            .map(|last| at - last < self.interval)
            .unwrap_or(false);

        if throttled {
            self.held = Some(self.held.map_or(percent, |h| h.max(percent)));
            return false;
        }

        self.last_accepted = Some(at);
        self.max = self.max.max(percent);
        if let Some(held) = self.held.take() {
            self.max = self.max.max(held);
        }
        true
    }

    /// Committed depth plus anything still held back.
    pub fn current(&self) -> i32 {
        self.held.map_or(self.max, |h| self.max.max(h))
    }

    pub fn reset(&mut self) {
        self.max = 0;
        self.held = None;
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn metrics(top: f64, viewport: f64, doc: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: top,
            viewport_height: viewport,
            document_height: doc,
        }
    }

    #[test]
    fn test_percent_formula_and_clamp() {
        assert_eq!(metrics(0.0, 500.0, 2000.0).percent(), Some(25));
        assert_eq!(metrics(1500.0, 500.0, 2000.0).percent(), Some(100));
        // Overscroll (rubber-banding) past the document end.
        assert_eq!(metrics(1700.0, 500.0, 2000.0).percent(), Some(100));
        assert_eq!(metrics(-400.0, 100.0, 2000.0).percent(), Some(0));
    }

    #[test]
    fn test_percent_rejects_zero_height_document() {
        assert_eq!(metrics(0.0, 500.0, 0.0).percent(), None);
        assert_eq!(metrics(0.0, 500.0, f64::NAN).percent(), None);
    }

    #[test]
    fn test_depth_is_monotonic() {
        let mut depth = ScrollDepth::new(std::time::Duration::ZERO);
        depth.observe(40, t0());
        depth.observe(80, t0());
        depth.observe(10, t0());
        assert_eq!(depth.current(), 80);
    }

    #[test]
    fn test_throttled_samples_are_held_not_lost() {
        let mut depth = ScrollDepth::new(std::time::Duration::from_millis(250));
        assert!(depth.observe(30, t0()));
        assert!(!depth.observe(90, t0() + Duration::milliseconds(100)));
        assert_eq!(depth.current(), 90);

        assert!(depth.observe(50, t0() + Duration::milliseconds(300)));
        assert_eq!(depth.current(), 90);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut depth = ScrollDepth::new(std::time::Duration::from_millis(250));
        depth.observe(70, t0());
        depth.observe(95, t0() + Duration::milliseconds(10));
        depth.reset();
        assert_eq!(depth.current(), 0);
        // A fresh page accepts its first sample immediately.
        assert!(depth.observe(5, t0() + Duration::milliseconds(20)));
    }
}
