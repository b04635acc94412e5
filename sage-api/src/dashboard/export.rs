//! CSV export of the daily series

use super::series::SeriesPoint;
use chrono::NaiveDate;
use std::fmt::Write;

pub const CSV_HEADER: &str = "Date,Accounts,Revenue,Replies";

/// Render the series as CSV, one row per day in series order
pub fn to_csv(points: &[SeriesPoint]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + points.len() * 32);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for point in points {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{}",
            point.date.format("%Y-%m-%d"),
            point.account_count,
            point.revenue,
            point.reply_count
        );
    }

    out
}

/// Download name for an export produced on `date`
pub fn file_name(date: NaiveDate) -> String {
    format!("inboxsage-analytics-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows() {
        let points = vec![
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2025, 6, 29).unwrap(),
                account_count: 3,
                revenue: 87,
                reply_count: 12,
            },
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                account_count: 0,
                revenue: 0,
                reply_count: 4,
            },
        ];

        let csv = to_csv(&points);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines, vec![CSV_HEADER, "2025-06-29,3,87,12", "2025-06-30,0,0,4"]);
    }

    #[test]
    fn test_empty_series_is_header_only() {
        assert_eq!(to_csv(&[]), "Date,Accounts,Revenue,Replies\n");
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(file_name(date), "inboxsage-analytics-2025-01-07.csv");
    }
}
