//! Recording sales: log first, then recompute the aggregate row from the
//! whole log.

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

use crate::diagnostics::Diagnostics;
use crate::numeric::{CurrencyAmount, CurrencyError};
use crate::price::parse_first_price;
use crate::sales_log::{SaleEvent, SalesLog, SalesLogError, ADDITION_PREFIX, BEVERAGE_PREFIX};
use crate::store::{AggregateStore, StoreError};

/// Error returned when a sale could not be recorded or summarized.
#[derive(Debug)]
pub enum RecordError {
    /// The sales log could not be written or read.
    SalesLog(SalesLogError),
    /// The aggregate row could not be read or written.
    Store(StoreError),
    /// Summing the log overflowed.
    Currency(CurrencyError),
    /// More sales in the log than the table can count.
    TooManySales(usize),
    /// Nothing to record.
    NoEvents,
    /// A sale is one beverage plus at most one addition.
    TooManyEvents(usize),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            RecordError::SalesLog(err) => format!("Sales log error: {}", err),
            RecordError::Store(err) => format!("Store error: {}", err),
            RecordError::Currency(err) => format!("Currency error: {}", err),
            RecordError::TooManySales(count) => format!("Too many sales to count: {}", count),
            RecordError::NoEvents => "No sale events to record".to_string(),
            RecordError::TooManyEvents(count) => {
                format!("A sale has at most 2 events, got {}", count)
            }
        })
    }
}

impl From<SalesLogError> for RecordError {
    fn from(err: SalesLogError) -> Self {
        Self::SalesLog(err)
    }
}

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<CurrencyError> for RecordError {
    fn from(err: CurrencyError) -> Self {
        Self::Currency(err)
    }
}

/// Figures derived from a complete sales log.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SaleSummary {
    /// Beverage lines in the log.
    pub beverages: usize,
    /// Addition lines in the log.
    pub additions: usize,
    /// Sum of every parseable price, rounded to cents.
    pub total_amount: CurrencyAmount,
}

impl SaleSummary {
    /// Beverages and additions together.
    pub fn sale_count(&self) -> usize {
        self.beverages + self.additions
    }
}

/// Appends sales to a salesperson's log and keeps their aggregate row in
/// step with it.
///
/// The row is always rebuilt from the full log, never incremented, so an
/// earlier run that died between the log write and the table write is
/// corrected by the next sale.
pub struct SalesRecorder<'a> {
    store: &'a AggregateStore,
    diagnostics: Rc<dyn Diagnostics>,
}

impl<'a> SalesRecorder<'a> {
    /// Records into `store`, reporting through `diagnostics`.
    pub fn new(store: &'a AggregateStore, diagnostics: Rc<dyn Diagnostics>) -> Self {
        Self { store, diagnostics }
    }

    /// Appends `formatted_line` (followed by `second_line`, if any) to the
    /// log at `log_path`, then upserts the row for `fullname` with figures
    /// recomputed from the whole log.
    ///
    /// # Errors
    ///
    /// Fails if the log cannot be written or read, or the store rejects the
    /// write. Lines without a price are skipped, not treated as errors.
    pub fn record_sale(
        &self,
        fullname: &str,
        log_path: &Path,
        formatted_line: &str,
        second_line: Option<&str>,
    ) -> Result<SaleSummary, RecordError> {
        let log = SalesLog::new(log_path);
        let mut lines = vec![formatted_line];
        lines.extend(second_line);

        log.append_all(&lines)?;
        self.diagnostics.debug(&format!(
            "Wrote {} line(s) for {} to {}",
            lines.len(),
            fullname,
            log.path().display()
        ));

        let summary = self.summarize(&log)?;
        self.upsert(fullname, &summary)?;
        Ok(summary)
    }

    /// Records a beverage and its optional addition as one sale.
    pub fn record_events(
        &self,
        fullname: &str,
        log: &SalesLog,
        events: &[SaleEvent],
    ) -> Result<SaleSummary, RecordError> {
        let (beverage, addition) = match events {
            [] => return Err(RecordError::NoEvents),
            [beverage] => (beverage, None),
            [beverage, addition] => (beverage, Some(addition.to_string())),
            _ => return Err(RecordError::TooManyEvents(events.len())),
        };

        self.record_sale(
            fullname,
            log.path(),
            &beverage.to_string(),
            addition.as_deref(),
        )
    }

    /// Recounts sales and resums prices from the full log.
    ///
    /// Lines with no price are reported through the diagnostics sink and
    /// left out of the total.
    pub fn summarize(&self, log: &SalesLog) -> Result<SaleSummary, RecordError> {
        let counts = log.count_by_prefix(&[BEVERAGE_PREFIX, ADDITION_PREFIX])?;
        let beverages = counts.get(BEVERAGE_PREFIX).copied().unwrap_or(0);
        let additions = counts.get(ADDITION_PREFIX).copied().unwrap_or(0);
        self.diagnostics.info(&format!(
            "{} beverages and {} additions in {}",
            beverages,
            additions,
            log.path().display()
        ));

        let prices = log
            .read_all_lines()?
            .into_iter()
            .filter_map(|line| match parse_first_price(&line) {
                Ok(price) => Some(price),
                Err(err) => {
                    self.diagnostics
                        .warn(&format!("Sale price is missing, skipping line: {}", err));
                    None
                }
            });
        let total_amount = CurrencyAmount::checked_sum(prices)?.round_cents();
        self.diagnostics
            .info(&format!("Total sales amount calculated: {}", total_amount));

        Ok(SaleSummary {
            beverages,
            additions,
            total_amount,
        })
    }

    fn upsert(&self, fullname: &str, summary: &SaleSummary) -> Result<(), RecordError> {
        let count = summary.sale_count();
        let sale_count = u32::try_from(count).map_err(|_| RecordError::TooManySales(count))?;

        if self.store.exists(fullname)? {
            self.store
                .update(fullname, sale_count, summary.total_amount)?;
        } else {
            self.store
                .insert(fullname, sale_count, summary.total_amount)?;
        }
        Ok(())
    }
}
