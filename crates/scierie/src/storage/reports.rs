use chrono::NaiveDate;
use rusqlite::{params, types::Type, Row};

use super::Storage;
use crate::error::Result;
use crate::report::{ReportEntry, ReportKind};
use crate::timestamp;

impl Storage {
    /// Every row of `kind` dated in `[start, end)`, oldest first, reduced to
    /// its date and amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn report_entries(
        &self,
        kind: ReportKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReportEntry>> {
        let sql = format!(
            "SELECT date, {amount} FROM {table} WHERE date >= ?1 AND date < ?2 ORDER BY date, id",
            amount = kind.amount_column(),
            table = kind.table(),
        );
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(
                params![timestamp::day_start(start), timestamp::day_start(end)],
                |row| {
                    Ok(ReportEntry {
                        date: timestamp::column(row, 0)?,
                        total: row.get(1)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Amount of `kind` per calendar day in `[start, end)`. Days with no
    /// rows are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn report_daily_sums(
        &self,
        kind: ReportKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        let sql = format!(
            r"
            SELECT substr(date, 1, 10) AS day, SUM({amount})
            FROM {table}
            WHERE date >= ?1 AND date < ?2
            GROUP BY day
            ORDER BY day
            ",
            amount = kind.amount_column(),
            table = kind.table(),
        );
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let sums = stmt
            .query_map(
                params![timestamp::day_start(start), timestamp::day_start(end)],
                row_to_day_sum,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sums)
    }

    /// Amount of `kind` per week of the month in `[start, end)`: days 1-7,
    /// 8-14, 15-21 and 22 to the end of the month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn report_week_of_month_sums(
        &self,
        kind: ReportKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<[f64; 4]> {
        let sql = format!(
            r"
            SELECT MIN((CAST(strftime('%d', date) AS INTEGER) - 1) / 7, 3) AS bucket,
                   SUM({amount})
            FROM {table}
            WHERE date >= ?1 AND date < ?2
            GROUP BY bucket
            ",
            amount = kind.amount_column(),
            table = kind.table(),
        );
        let mut sums = [0.0; 4];
        self.fill_buckets(&sql, start, end, 0, &mut sums)?;
        Ok(sums)
    }

    /// Amount of `kind` per calendar month in `[start, end)`, January first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn report_monthly_sums(
        &self,
        kind: ReportKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<[f64; 12]> {
        let sql = format!(
            r"
            SELECT CAST(strftime('%m', date) AS INTEGER) AS month, SUM({amount})
            FROM {table}
            WHERE date >= ?1 AND date < ?2
            GROUP BY month
            ",
            amount = kind.amount_column(),
            table = kind.table(),
        );
        let mut sums = [0.0; 12];
        self.fill_buckets(&sql, start, end, 1, &mut sums)?;
        Ok(sums)
    }

    /// Run a `(bucket, sum)` query and store each sum at `bucket - first`.
    fn fill_buckets(
        &self,
        sql: &str,
        start: NaiveDate,
        end: NaiveDate,
        first: i64,
        sums: &mut [f64],
    ) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(
            params![timestamp::day_start(start), timestamp::day_start(end)],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
        )?;

        for row in rows {
            let (bucket, sum) = row?;
            if let Some(slot) = usize::try_from(bucket - first)
                .ok()
                .and_then(|idx| sums.get_mut(idx))
            {
                *slot = sum;
            }
        }
        Ok(())
    }
}

fn row_to_day_sum(row: &Row<'_>) -> rusqlite::Result<(NaiveDate, f64)> {
    let day: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    Ok((date, row.get(1)?))
}
