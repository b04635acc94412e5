//! Daily series for the dashboard charts

use crate::config::SeriesMode;
use crate::models::{AccountRecord, ReplyRecord};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Jitter bounds of the synthetic series (exclusive)
const ACCOUNT_JITTER: u64 = 10;
const REVENUE_JITTER: u64 = 1000;
const REPLY_JITTER: u64 = 50;

/// One day of the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub account_count: u64,
    pub revenue: u64,
    pub reply_count: u64,
}

/// Inputs shared by every mode
pub struct SeriesInput<'a> {
    pub accounts: &'a [AccountRecord],
    pub replies: &'a [ReplyRecord],
    pub mrr: f64,
    pub price_per_account: f64,
}

/// The `days` calendar dates ending today, oldest first
pub fn trailing_dates(now: DateTime<Utc>, days: u32) -> Vec<NaiveDate> {
    let today = now.date_naive();
    (0..days as i64)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

pub fn build<R: Rng>(
    mode: SeriesMode,
    input: &SeriesInput<'_>,
    now: DateTime<Utc>,
    days: u32,
    rng: &mut R,
) -> Vec<SeriesPoint> {
    let dates = trailing_dates(now, days);
    match mode {
        SeriesMode::Historical => historical(&dates, input),
        SeriesMode::Synthetic => synthetic(&dates, input, rng),
        SeriesMode::Flat => flat(&dates, input),
    }
}

fn daily_means(input: &SeriesInput<'_>) -> (f64, f64, f64) {
    // Totals are spread over a fixed 30 day month whatever the series length
    (
        input.accounts.len() as f64 / 30.0,
        input.mrr / 30.0,
        input.replies.len() as f64 / 30.0,
    )
}

fn synthetic<R: Rng>(dates: &[NaiveDate], input: &SeriesInput<'_>, rng: &mut R) -> Vec<SeriesPoint> {
    let (accounts, revenue, replies) = daily_means(input);

    dates
        .iter()
        .map(|&date| SeriesPoint {
            date,
            account_count: (rng.gen_range(0..ACCOUNT_JITTER) as f64 + accounts).floor() as u64,
            revenue: (rng.gen_range(0..REVENUE_JITTER) as f64 + revenue).floor() as u64,
            reply_count: (rng.gen_range(0..REPLY_JITTER) as f64 + replies).floor() as u64,
        })
        .collect()
}

fn flat(dates: &[NaiveDate], input: &SeriesInput<'_>) -> Vec<SeriesPoint> {
    let (accounts, revenue, replies) = daily_means(input);

    dates
        .iter()
        .map(|&date| SeriesPoint {
            date,
            account_count: accounts.floor() as u64,
            revenue: revenue.floor() as u64,
            reply_count: replies.floor() as u64,
        })
        .collect()
}

fn historical(dates: &[NaiveDate], input: &SeriesInput<'_>) -> Vec<SeriesPoint> {
    let mut new_accounts: HashMap<NaiveDate, u64> = HashMap::new();
    for ts in input.accounts.iter().filter_map(|a| a.created_at) {
        *new_accounts.entry(ts.date_naive()).or_default() += 1;
    }

    let mut new_replies: HashMap<NaiveDate, u64> = HashMap::new();
    for ts in input.replies.iter().filter_map(|r| r.created_at) {
        *new_replies.entry(ts.date_naive()).or_default() += 1;
    }

    dates
        .iter()
        .map(|date| {
            let account_count = new_accounts.get(date).copied().unwrap_or(0);
            SeriesPoint {
                date: *date,
                account_count,
                revenue: (account_count as f64 * input.price_per_account).floor() as u64,
                reply_count: new_replies.get(date).copied().unwrap_or(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 15, 0, 0).unwrap()
    }

    fn account(id: &str, created: DateTime<Utc>) -> AccountRecord {
        AccountRecord {
            id: id.to_string(),
            created_at: Some(created),
            ..Default::default()
        }
    }

    fn reply(id: &str, created: DateTime<Utc>) -> ReplyRecord {
        ReplyRecord {
            id: id.to_string(),
            user_id: None,
            created_at: Some(created),
        }
    }

    #[test]
    fn test_trailing_dates_oldest_first() {
        let dates = trailing_dates(now(), 30);
        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(dates[29], NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_every_mode_has_thirty_points() {
        let accounts: Vec<_> = (0..45).map(|i| account(&i.to_string(), now())).collect();
        let input = SeriesInput {
            accounts: &accounts,
            replies: &[],
            mrr: 45.0 * 29.0,
            price_per_account: 29.0,
        };
        let mut rng = StdRng::seed_from_u64(7);

        for mode in [SeriesMode::Historical, SeriesMode::Synthetic, SeriesMode::Flat] {
            let points = build(mode, &input, now(), 30, &mut rng);
            assert_eq!(points.len(), 30, "{:?}", mode);
            assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[test]
    fn test_synthetic_stays_within_jitter_bounds() {
        let accounts: Vec<_> = (0..60).map(|i| account(&i.to_string(), now())).collect();
        let replies: Vec<_> = (0..300).map(|i| reply(&i.to_string(), now())).collect();
        let input = SeriesInput {
            accounts: &accounts,
            replies: &replies,
            mrr: 60.0 * 29.0,
            price_per_account: 29.0,
        };
        let mut rng = StdRng::seed_from_u64(42);

        for point in build(SeriesMode::Synthetic, &input, now(), 30, &mut rng) {
            // means: 2 accounts, 58 revenue, 10 replies per day
            assert!((2..12).contains(&point.account_count));
            assert!((58..1058).contains(&point.revenue));
            assert!((10..60).contains(&point.reply_count));
        }
    }

    #[test]
    fn test_flat_uses_daily_mean() {
        let accounts: Vec<_> = (0..90).map(|i| account(&i.to_string(), now())).collect();
        let input = SeriesInput {
            accounts: &accounts,
            replies: &[],
            mrr: 90.0 * 29.0,
            price_per_account: 29.0,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let points = build(SeriesMode::Flat, &input, now(), 30, &mut rng);
        assert!(points.iter().all(|p| p.account_count == 3 && p.revenue == 87 && p.reply_count == 0));
    }

    #[test]
    fn test_historical_counts_per_day() {
        let day = |d: u32, h: u32| Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap();
        let accounts = vec![
            account("a", day(30, 1)),
            account("b", day(30, 9)),
            account("c", day(1, 0)),
            // outside the window
            account("d", Utc.with_ymd_and_hms(2025, 5, 31, 23, 0, 0).unwrap()),
            AccountRecord {
                id: "e".to_string(),
                ..Default::default()
            },
        ];
        let replies = vec![reply("r1", day(15, 12)), reply("r2", day(15, 13)), reply("r3", day(30, 8))];
        let input = SeriesInput {
            accounts: &accounts,
            replies: &replies,
            mrr: 0.0,
            price_per_account: 29.0,
        };
        let mut rng = StdRng::seed_from_u64(0);

        let points = build(SeriesMode::Historical, &input, now(), 30, &mut rng);

        assert_eq!(points[0].account_count, 1);
        assert_eq!(points[0].revenue, 29);
        assert_eq!(points[14].reply_count, 2);
        assert_eq!(points[29].account_count, 2);
        assert_eq!(points[29].revenue, 58);
        assert_eq!(points[29].reply_count, 1);

        let total: u64 = points.iter().map(|p| p.account_count).sum();
        assert_eq!(total, 3);
    }
}
