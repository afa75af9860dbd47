//! Date-bucketed reports over one kind of record.
//!
//! The storage layer does the aggregation in SQL; this module picks the
//! date range for a period, asks for the right buckets and shapes them into
//! the JSON the reports page charts.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::timestamp;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Which records a report covers, and the column that holds their amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Supplier charges, summed on `prix`.
    Charges,
    /// Expenses, summed on `montant`.
    Depenses,
    /// Invoices, summed on `total`.
    Factures,
    /// Production batches, summed on `total`.
    Productions,
    /// Sales, summed on `total`.
    Ventes,
    /// Stock lines, summed on `total`.
    Stocks,
}

impl ReportKind {
    /// Parse the `type` query parameter.
    ///
    /// # Errors
    ///
    /// Returns `Type invalide` for a missing or unknown type.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            Some("charges") => Ok(Self::Charges),
            Some("depenses") => Ok(Self::Depenses),
            Some("factures") => Ok(Self::Factures),
            Some("productions") => Ok(Self::Productions),
            Some("ventes") => Ok(Self::Ventes),
            Some("stocks") => Ok(Self::Stocks),
            _ => Err(Error::invalid_input("Type invalide")),
        }
    }

    /// Table holding the records.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Charges => "charges",
            Self::Depenses => "depenses",
            Self::Factures => "factures",
            Self::Productions => "productions",
            Self::Ventes => "ventes",
            Self::Stocks => "stocks",
        }
    }

    /// Column summed by the report.
    #[must_use]
    pub fn amount_column(self) -> &'static str {
        match self {
            Self::Charges => "prix",
            Self::Depenses => "montant",
            Self::Factures | Self::Productions | Self::Ventes | Self::Stocks => "total",
        }
    }
}

/// Bucketing of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    /// Every row of one day.
    Daily,
    /// Per day over a Monday-to-Sunday week, with the previous week.
    #[default]
    Weekly,
    /// Per week of a calendar month.
    Monthly,
    /// Per month of a calendar year.
    Yearly,
}

impl Period {
    /// Parse the `period` query parameter; absent means weekly.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for an unknown period.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some("daily") => Ok(Self::Daily),
            Some("weekly") => Ok(Self::Weekly),
            Some("monthly") => Ok(Self::Monthly),
            Some("yearly") => Ok(Self::Yearly),
            Some(other) => Err(Error::invalid_input(format!("Période invalide : {other}"))),
        }
    }

    /// The `[start, end)` days covered by this period around `date`.
    #[must_use]
    pub fn range(self, date: NaiveDate) -> DateRange {
        match self {
            Self::Daily => DateRange::new(date, next_day(date)),
            Self::Weekly => {
                let start = week_start(date);
                DateRange::new(start, add_days(start, 7))
            }
            Self::Monthly => {
                let start = date.with_day(1).unwrap_or(date);
                DateRange::new(start, add_months(start, 1))
            }
            Self::Yearly => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                DateRange::new(start, add_months(start, 12))
            }
        }
    }
}

/// Half-open range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day included.
    pub start: NaiveDate,
    /// First day excluded.
    pub end: NaiveDate,
}

impl DateRange {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date)
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    add_days(date, 1)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Parse the `date` query parameter; absent means `today`.
///
/// # Errors
///
/// Returns an invalid-input error for a malformed date.
pub fn parse_report_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match value.map(str::trim) {
        None | Some("") => Ok(today),
        Some(text) => timestamp::parse_input(text)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| Error::invalid_input(format!("Date invalide : {text}"))),
    }
}

/// One row of a daily report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// When the record is dated.
    pub date: DateTime<Utc>,
    /// Its amount.
    pub total: f64,
}

/// Rows of a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    /// The rows, oldest first.
    pub items: Vec<ReportEntry>,
    /// Sum of the rows.
    pub total: f64,
}

/// One weekday of a weekly report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayValue {
    /// English weekday name (`Monday` ...).
    pub day: String,
    /// Amount that day.
    pub value: f64,
    /// Amount the same weekday of the previous week.
    pub prev: f64,
}

/// A week compared with the one before.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// Monday to Sunday.
    pub data: Vec<DayValue>,
    /// Sum over this week.
    pub total_current: f64,
    /// Sum over the previous week.
    pub total_prev: f64,
    /// Change from the previous week, in percent. 100 when the previous
    /// week is zero.
    pub percent_change: f64,
}

/// One week of a monthly report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekValue {
    /// `Semaine N`.
    pub week: String,
    /// Amount that week.
    pub value: f64,
}

/// A month in four weekly buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    /// Days 1-7, 8-14, 15-21 and 22 to the end.
    pub data: Vec<WeekValue>,
    /// Sum over the month.
    pub total: f64,
}

/// One month of a yearly report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthValue {
    /// Three-letter English month name.
    pub month: String,
    /// Amount that month.
    pub value: f64,
}

/// A year in twelve monthly buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyReport {
    /// January to December.
    pub data: Vec<MonthValue>,
    /// Sum over the year.
    pub total: f64,
}

/// Any report; serializes as the inner shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Daily.
    Daily(DailyReport),
    /// Weekly.
    Weekly(WeeklyReport),
    /// Monthly.
    Monthly(MonthlyReport),
    /// Yearly.
    Yearly(YearlyReport),
}

/// Build the report of `kind` for the `period` containing `date`.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn build_report(
    storage: &Storage,
    kind: ReportKind,
    period: Period,
    date: NaiveDate,
) -> Result<Report> {
    let range = period.range(date);
    let report = match period {
        Period::Daily => {
            let items = storage.report_entries(kind, range.start, range.end)?;
            let total = items.iter().map(|item| item.total).sum();
            Report::Daily(DailyReport { items, total })
        }
        Period::Weekly => {
            let prev_start = range
                .start
                .checked_sub_days(Days::new(7))
                .unwrap_or(range.start);
            let current = storage.report_daily_sums(kind, range.start, range.end)?;
            let previous = storage.report_daily_sums(kind, prev_start, range.start)?;
            Report::Weekly(weekly_report(range.start, &current, &previous))
        }
        Period::Monthly => {
            let sums = storage.report_week_of_month_sums(kind, range.start, range.end)?;
            Report::Monthly(monthly_report(sums))
        }
        Period::Yearly => {
            let sums = storage.report_monthly_sums(kind, range.start, range.end)?;
            Report::Yearly(yearly_report(sums))
        }
    };
    Ok(report)
}

/// Shape per-day sums of a week and of the week before it.
fn weekly_report(
    start: NaiveDate,
    current: &[(NaiveDate, f64)],
    previous: &[(NaiveDate, f64)],
) -> WeeklyReport {
    let sum_on = |sums: &[(NaiveDate, f64)], day: NaiveDate| {
        sums.iter()
            .filter(|(d, _)| *d == day)
            .map(|(_, v)| v)
            .sum::<f64>()
    };

    let data: Vec<DayValue> = (0..7)
        .map(|offset| {
            let day = add_days(start, offset);
            let same_day_before = day.checked_sub_days(Days::new(7)).unwrap_or(day);
            DayValue {
                day: day.format("%A").to_string(),
                value: sum_on(current, day),
                prev: sum_on(previous, same_day_before),
            }
        })
        .collect();

    let total_current = data.iter().map(|d| d.value).sum();
    let total_prev = data.iter().map(|d| d.prev).sum();

    WeeklyReport {
        data,
        total_current,
        total_prev,
        percent_change: percent_change(total_current, total_prev),
    }
}

/// Change from `previous` to `current` in percent; 100 when `previous` is 0.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous.abs() < f64::EPSILON {
        100.0
    } else {
        (current - previous) / previous * 100.0
    }
}

fn monthly_report(sums: [f64; 4]) -> MonthlyReport {
    let data: Vec<WeekValue> = sums
        .iter()
        .enumerate()
        .map(|(idx, value)| WeekValue {
            week: format!("Semaine {}", idx + 1),
            value: *value,
        })
        .collect();
    MonthlyReport {
        total: sums.iter().sum(),
        data,
    }
}

fn yearly_report(sums: [f64; 12]) -> YearlyReport {
    let data: Vec<MonthValue> = MONTH_LABELS
        .iter()
        .zip(sums)
        .map(|(month, value)| MonthValue {
            month: (*month).to_string(),
            value,
        })
        .collect();
    YearlyReport {
        total: sums.iter().sum(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::NewExpense;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ReportKind::parse(Some("ventes")).unwrap(), ReportKind::Ventes);
        assert_eq!(ReportKind::parse(Some("charges")).unwrap().amount_column(), "prix");
        assert_eq!(ReportKind::parse(Some("depenses")).unwrap().amount_column(), "montant");

        let err = ReportKind::parse(Some("clients")).unwrap_err();
        assert_eq!(err.to_string(), "Type invalide");
        assert!(ReportKind::parse(None).is_err());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse(None).unwrap(), Period::Weekly);
        assert_eq!(Period::parse(Some("yearly")).unwrap(), Period::Yearly);
        assert!(Period::parse(Some("hourly")).unwrap_err().is_client_error());
    }

    #[test]
    fn test_week_starts_monday() {
        // 2025-03-13 is a Thursday.
        assert_eq!(week_start(day(2025, 3, 13)), day(2025, 3, 10));
        assert_eq!(week_start(day(2025, 3, 10)), day(2025, 3, 10));
        assert_eq!(week_start(day(2025, 3, 16)), day(2025, 3, 10));
    }

    #[test]
    fn test_ranges() {
        let date = day(2024, 2, 14);
        assert_eq!(
            Period::Daily.range(date),
            DateRange::new(day(2024, 2, 14), day(2024, 2, 15))
        );
        assert_eq!(
            Period::Weekly.range(date),
            DateRange::new(day(2024, 2, 12), day(2024, 2, 19))
        );
        assert_eq!(
            Period::Monthly.range(date),
            DateRange::new(day(2024, 2, 1), day(2024, 3, 1))
        );
        assert_eq!(
            Period::Yearly.range(date),
            DateRange::new(day(2024, 1, 1), day(2025, 1, 1))
        );
    }

    #[test]
    fn test_parse_report_date() {
        let today = day(2025, 1, 1);
        assert_eq!(parse_report_date(None, today).unwrap(), today);
        assert_eq!(parse_report_date(Some("2025-06-30"), today).unwrap(), day(2025, 6, 30));
        assert!(parse_report_date(Some("30/06/2025"), today).is_err());
    }

    #[test]
    fn test_percent_change() {
        assert!((percent_change(50.0, 0.0) - 100.0).abs() < f64::EPSILON);
        assert!((percent_change(150.0, 100.0) - 50.0).abs() < f64::EPSILON);
        assert!((percent_change(50.0, 100.0) + 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weekly_report_aligns_previous_week() {
        let start = day(2025, 3, 10);
        let current = vec![(day(2025, 3, 10), 30.0), (day(2025, 3, 12), 20.0)];
        let previous = vec![(day(2025, 3, 3), 10.0), (day(2025, 3, 9), 15.0)];

        let report = weekly_report(start, &current, &previous);
        assert_eq!(report.data.len(), 7);
        assert_eq!(report.data[0].day, "Monday");
        assert_eq!(report.data[6].day, "Sunday");
        assert!((report.data[0].value - 30.0).abs() < f64::EPSILON);
        assert!((report.data[0].prev - 10.0).abs() < f64::EPSILON);
        assert!((report.data[6].prev - 15.0).abs() < f64::EPSILON);
        assert!((report.total_current - 50.0).abs() < f64::EPSILON);
        assert!((report.total_prev - 25.0).abs() < f64::EPSILON);
        assert!((report.percent_change - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monthly_and_yearly_labels() {
        let monthly = monthly_report([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(monthly.data[0].week, "Semaine 1");
        assert_eq!(monthly.data[3].week, "Semaine 4");
        assert!((monthly.total - 10.0).abs() < f64::EPSILON);

        let yearly = yearly_report([1.0; 12]);
        assert_eq!(yearly.data[0].month, "Jan");
        assert_eq!(yearly.data[11].month, "Dec");
        assert!((yearly.total - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_json_shapes() {
        let weekly = serde_json::to_value(Report::Weekly(weekly_report(
            day(2025, 3, 10),
            &[],
            &[],
        )))
        .unwrap();
        assert!(weekly["data"].is_array());
        assert!(weekly.get("totalCurrent").is_some());
        assert!(weekly.get("percentChange").is_some());

        let daily = serde_json::to_value(Report::Daily(DailyReport {
            items: Vec::new(),
            total: 0.0,
        }))
        .unwrap();
        assert!(daily["items"].is_array());
        assert_eq!(daily["total"], 0.0);
    }

    #[test]
    fn test_build_report_from_storage() {
        let storage = Storage::open_in_memory().unwrap();
        for (d, montant) in [(3, 10.0), (10, 20.0), (11, 5.0)] {
            storage
                .create_expense(&NewExpense {
                    date: Utc.with_ymd_and_hms(2025, 3, d, 9, 0, 0).unwrap(),
                    categorie: "Divers".to_string(),
                    montant,
                })
                .unwrap();
        }

        let Report::Weekly(weekly) =
            build_report(&storage, ReportKind::Depenses, Period::Weekly, day(2025, 3, 12)).unwrap()
        else {
            panic!("expected a weekly report");
        };
        assert!((weekly.total_current - 25.0).abs() < f64::EPSILON);
        assert!((weekly.total_prev - 10.0).abs() < f64::EPSILON);
        assert!((weekly.percent_change - 150.0).abs() < 1e-9);

        let Report::Daily(daily) =
            build_report(&storage, ReportKind::Depenses, Period::Daily, day(2025, 3, 10)).unwrap()
        else {
            panic!("expected a daily report");
        };
        assert_eq!(daily.items.len(), 1);
        assert!((daily.total - 20.0).abs() < f64::EPSILON);
    }
}
