//! Aggregates shown on the dashboard: account totals and premium sign-ups
//! per month.
use chrono::{Datelike, Month};

use crate::records::{AccountStatus, AccountType, UserRecord};

/// The chart always covers twelve consecutive months from June 2024.
pub const CHART_START: (i32, u32) = (2024, 6);
pub const CHART_MONTHS: usize = 12;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub users: usize,
    pub premium: usize,
    pub suspended: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub premium_signups: u64,
}

impl MonthBucket {
    /// Three-letter label for the chart axis.
    pub fn label(&self) -> String {
        Month::try_from(self.month as u8)
            .map(|m| m.name()[..3].to_string())
            .unwrap_or_default()
    }
}

pub fn totals(users: &[UserRecord]) -> Totals {
    Totals {
        users: users.len(),
        premium: users.iter().filter(|u| u.account_type == AccountType::Premium).count(),
        suspended: users.iter().filter(|u| u.status == AccountStatus::Suspended).count(),
    }
}

/// Empty buckets for the chart window.
pub fn empty_chart() -> Vec<MonthBucket> {
    let (mut year, mut month) = CHART_START;
    (0..CHART_MONTHS)
        .map(|_| {
            let bucket = MonthBucket { year, month, premium_signups: 0 };
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
            bucket
        })
        .collect()
}

/// Premium accounts counted by the year and month their subscription started.
/// Accounts outside the window or without a start date are not counted.
pub fn premium_chart(users: &[UserRecord]) -> Vec<MonthBucket> {
    let mut chart = empty_chart();
    for user in users.iter().filter(|u| u.subscription.premium) {
        let Some(start) = user.subscription.started_at else { continue };
        if let Some(bucket) = chart
            .iter_mut()
            .find(|b| b.year == start.year() && b.month == start.month())
        {
            bucket.premium_signups += 1;
        }
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Subscription;
    use chrono::{TimeZone, Utc};

    fn user(id: &str, premium: bool, blocked: bool, y: i32, m: u32) -> UserRecord {
        let at = Utc.with_ymd_and_hms(y, m, 15, 0, 0, 0).unwrap();
        UserRecord {
            id: id.into(),
            name: id.into(),
            email: format!("{id}@x.io"),
            account_type: AccountType::from_premium(premium),
            status: AccountStatus::from_blocked(blocked),
            joined_at: Some(at),
            last_login_at: None,
            location: None,
            avatar: String::new(),
            images: Vec::new(),
            subscription: Subscription { premium, started_at: Some(at), renewed_at: None },
        }
    }

    #[test]
    fn chart_spans_june_to_may() {
        let chart = empty_chart();
        assert_eq!(chart.len(), 12);
        assert_eq!((chart[0].year, chart[0].month), (2024, 6));
        assert_eq!((chart[11].year, chart[11].month), (2025, 5));
        assert_eq!(chart[0].label(), "Jun");
    }

    #[test]
    fn signups_bucket_by_year_and_month() {
        let users = vec![
            user("a", true, false, 2024, 6),
            user("b", true, true, 2024, 6),
            user("c", false, false, 2024, 6),
            // Same month name, different year: outside the window.
            user("d", true, false, 2023, 6),
            user("e", true, false, 2025, 1),
        ];
        let chart = premium_chart(&users);
        assert_eq!(chart[0].premium_signups, 2);
        assert_eq!(chart[7].premium_signups, 1);
        assert_eq!(chart.iter().map(|b| b.premium_signups).sum::<u64>(), 3);

        let t = totals(&users);
        assert_eq!(t, Totals { users: 5, premium: 4, suspended: 1 });
    }
}
