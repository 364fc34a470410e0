//! Synthetic download statistics for seeding a local registry database.
//!
//! Each version gets a base popularity; daily counts vary around it. The
//! output is only meant for development databases.

use chrono::{Days, NaiveDate};
use rand::Rng;
use std::fmt::Write as _;

/// Downloads of one version on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyDownloads {
    /// Version identifier.
    pub version: String,
    /// Calendar day.
    pub day: NaiveDate,
    /// Number of downloads.
    pub count: u64,
}

/// Generate `days` days of counts per version, ending at `today`, oldest first.
pub fn generate<R: Rng>(
    versions: &[String],
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<DailyDownloads> {
    // Offsets past the earliest representable date produce no rows.
    let reachable = today.signed_duration_since(NaiveDate::MIN).num_days();
    let days = u64::from(days).min(u64::try_from(reachable).unwrap_or(0) + 1);
    let mut rows = Vec::new();

    for version in versions {
        let base: u64 = rng.gen_range(10..=1_000);
        for offset in (0..days).rev() {
            let Some(day) = today.checked_sub_days(Days::new(offset)) else {
                continue;
            };
            let count = rng.gen_range(base / 2..=base + base / 2);
            rows.push(DailyDownloads {
                version: version.clone(),
                day,
                count,
            });
        }
    }

    rows
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Render rows as one `INSERT` statement per row.
#[must_use]
pub fn insert_statements(table: &str, rows: &[DailyDownloads]) -> String {
    let mut sql = String::new();
    for row in rows {
        let _ = writeln!(
            sql,
            "INSERT INTO {table} (version, day, downloads) VALUES ({}, {}, {});",
            quote(&row.version),
            quote(&row.day.format("%Y-%m-%d").to_string()),
            row.count
        );
    }
    sql
}
