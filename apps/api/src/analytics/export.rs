use chrono::NaiveDate;

use crate::analytics::stats::DailyStats;

const CSV_HEADER: &str = "Date,Unique Visitors,Page Views,Avg Session Duration,Bounce Rate";

/// Renders the daily stats as CSV, one row per day. All fields are numeric or
/// ISO dates, so no quoting is needed.
pub fn render_csv(daily_stats: &[DailyStats]) -> String {
    let mut out = String::from(CSV_HEADER);
    for day in daily_stats {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{},{}",
            day.date.format("%Y-%m-%d"),
            day.unique_visitors,
            day.total_page_views,
            day.avg_session_duration.round() as i64,
            (day.bounce_rate * 100.0).round() / 100.0
        ));
    }
    out
}

pub fn file_name(today: NaiveDate) -> String {
    format!("analytics-{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(d: u32, visitors: i64, views: i64, duration: f64, bounce: f64) -> DailyStats {
        DailyStats {
            date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            unique_visitors: visitors,
            total_page_views: views,
            avg_session_duration: duration,
            bounce_rate: bounce,
            devotional_views: vec![],
            game_plays: vec![],
            top_devices: vec![],
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(render_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_rows_in_order() {
        let csv = render_csv(&[stats(1, 10, 25, 99.6, 0.4), stats(2, 3, 3, 0.0, 1.0)]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2024-03-01,10,25,100,0.4");
        assert_eq!(lines[2], "2024-03-02,3,3,0,1");
    }

    #[test]
    fn test_file_name() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(file_name(today), "analytics-2024-12-25.csv");
    }
}
