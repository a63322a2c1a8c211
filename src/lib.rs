//! Coffee counter library -- records sales per salesperson, keeps the shared
//! summary table in step with each salesperson's log, and renders that table
//! for the manager. Used by the CLI frontend.

#![deny(missing_docs)]

/// CSV reading and writing of aggregate rows.
pub mod csv;
/// Diagnostics sinks injected into components.
pub mod diagnostics;
/// Numeric module: contains currency-related types.
pub mod numeric;
/// File and folder layout.
pub mod paths;
/// Price extraction from sales log lines.
pub mod price;
/// Recording sales and recomputing aggregates.
pub mod recorder;
/// Table view and JSON/XML/CSV exports.
pub mod report;
/// Validation of sales entered at the counter.
pub mod request;
/// Employee roles and display names.
pub mod role;
/// Per-salesperson sales log files.
pub mod sales_log;
/// The shared aggregate table.
pub mod store;

pub use crate::diagnostics::{Diagnostics, LogDiagnostics, RecordingDiagnostics};
pub use crate::numeric::CurrencyAmount;
pub use crate::paths::StorageLayout;
pub use crate::recorder::{RecordError, SaleSummary, SalesRecorder};
pub use crate::report::{ReportError, ReportFormat, ReportRenderer};
pub use crate::request::{SaleRequest, SaleRequestError};
pub use crate::role::{full_display_name, Role};
pub use crate::sales_log::{SaleEvent, SaleKind, SalesLog};
pub use crate::store::{AggregateRecord, AggregateStore, StoreError};
