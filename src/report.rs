//! Rendering the aggregate table for the manager: a console table or one of
//! three export documents.

use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::csv::{CSVReader, CSVReaderError, CSVWriter, CSVWriterError};
use crate::diagnostics::Diagnostics;
use crate::numeric::{CurrencyAmount, CurrencyError};
use crate::paths::{employee_file, PathError};
use crate::store::{AggregateRecord, TABLE_NAME};

/// Shown instead of a table when nobody has sold anything yet.
pub const NO_RECORDS_MESSAGE: &str =
    "There are no sales records. Ask your salespeople to sell something...";

/// Output format of [`ReportRenderer::render`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportFormat {
    /// Tab-separated console table with a totals row.
    Table,
    /// `{"employees": [...]}` document.
    Json,
    /// `<employees>` document with one `<row>` per record.
    Xml,
    /// Header row plus one row per record.
    Csv,
}

impl ReportFormat {
    /// File extension for exportable formats.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ReportFormat::Table => None,
            ReportFormat::Json => Some("json"),
            ReportFormat::Xml => Some("xml"),
            ReportFormat::Csv => Some("csv"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "csv" => Ok(Self::Csv),
            _ => Err(ReportError::UnknownFormat(value.to_string())),
        }
    }
}

/// Error returned when a report could not be rendered, written or read back.
#[derive(Debug)]
pub enum ReportError {
    /// Format name not recognised by [`ReportFormat::from_str`].
    UnknownFormat(String),
    /// Tables are for the console only.
    NotExportable(ReportFormat),
    /// Totals overflowed.
    Currency(CurrencyError),
    /// JSON could not be written or parsed.
    Json(serde_json::Error),
    /// CSV could not be written.
    CsvWrite(CSVWriterError),
    /// CSV could not be parsed.
    CsvRead(CSVReaderError),
    /// The export folder could not be prepared.
    Path(PathError),
    /// The export file could not be written.
    Io {
        /// Final path of the export.
        path: PathBuf,
        /// Underlying failure.
        error: io::Error,
    },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            ReportError::UnknownFormat(format) => format!("Unknown report format '{}'", format),
            ReportError::NotExportable(format) => format!("{:?} reports cannot be exported", format),
            ReportError::Currency(err) => format!("Currency error: {}", err),
            ReportError::Json(err) => format!("JSON error: {}", err),
            ReportError::CsvWrite(err) => format!("{}", err),
            ReportError::CsvRead(err) => format!("{}", err),
            ReportError::Path(err) => format!("{}", err),
            ReportError::Io { path, error } => {
                format!("Failed to write '{}': {}", path.display(), error)
            }
        })
    }
}

impl From<CurrencyError> for ReportError {
    fn from(err: CurrencyError) -> Self {
        Self::Currency(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<CSVWriterError> for ReportError {
    fn from(err: CSVWriterError) -> Self {
        Self::CsvWrite(err)
    }
}

impl From<CSVReaderError> for ReportError {
    fn from(err: CSVReaderError) -> Self {
        Self::CsvRead(err)
    }
}

impl From<PathError> for ReportError {
    fn from(err: PathError) -> Self {
        Self::Path(err)
    }
}

/// Sum of all sale counts and of all amounts (rounded to cents).
pub fn totals(records: &[AggregateRecord]) -> Result<(u64, CurrencyAmount), CurrencyError> {
    let sales = records.iter().map(|r| u64::from(r.sale_count)).sum();
    let amount = CurrencyAmount::checked_sum(records.iter().map(|r| r.total_amount))?;
    Ok((sales, amount.round_cents()))
}

/// Renders and exports snapshots of the aggregate table.
pub struct ReportRenderer {
    diagnostics: Rc<dyn Diagnostics>,
}

impl ReportRenderer {
    /// Creates a renderer reporting exports through `diagnostics`.
    pub fn new(diagnostics: Rc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// Renders `snapshot` in `format`. Render every format from the same
    /// snapshot to keep them consistent.
    pub fn render(
        &self,
        format: ReportFormat,
        snapshot: &[AggregateRecord],
    ) -> Result<String, ReportError> {
        let rendered = match format {
            ReportFormat::Table => render_table(snapshot)?,
            ReportFormat::Json => render_json(snapshot)?,
            ReportFormat::Xml => render_xml(snapshot),
            ReportFormat::Csv => render_csv(snapshot)?,
        };
        self.diagnostics.debug(&format!(
            "Rendered {} records as {:?}",
            snapshot.len(),
            format
        ));
        Ok(rendered)
    }

    /// Writes `snapshot` to `<subfolder>/<fullname>_records.<ext>` and
    /// returns that path.
    ///
    /// The document goes to a temporary sibling first and is renamed into
    /// place only after it has been fully written and synced, so an error
    /// never leaves a partial export under the final name.
    pub fn export(
        &self,
        format: ReportFormat,
        snapshot: &[AggregateRecord],
        subfolder: &Path,
        fullname: &str,
    ) -> Result<PathBuf, ReportError> {
        let extension = format
            .extension()
            .ok_or(ReportError::NotExportable(format))?;
        let content = self.render(format, snapshot)?;
        let path = employee_file(subfolder, fullname, &format!("_records.{}", extension))?;
        let temp_path = path.with_extension(format!("{}.tmp", extension));

        let written = File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(content.as_bytes())?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&temp_path, &path));

        if let Err(error) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                self.diagnostics.debug(&format!(
                    "Could not remove {}: {}",
                    temp_path.display(),
                    cleanup
                ));
            }
            self.diagnostics
                .error(&format!("Export to {} failed: {}", path.display(), error));
            return Err(ReportError::Io { path, error });
        }

        self.diagnostics.info(&format!(
            "Stored {} sales records to {}",
            snapshot.len(),
            path.display()
        ));
        Ok(path)
    }
}

fn table_row(name: &str, sales: &dyn Display, amount: &dyn Display) -> String {
    format!("{:<30}\t|\t{:<15}\t|\t{}\n", name, sales.to_string(), amount)
}

fn render_table(records: &[AggregateRecord]) -> Result<String, ReportError> {
    if records.is_empty() {
        return Ok(format!("{}\n", NO_RECORDS_MESSAGE));
    }

    let (sales, amount) = totals(records)?;
    let mut table = table_row("Seller Name", &"Number Of Sales", &"Total Value ($)");
    for record in records {
        table.push_str(&table_row(
            &record.name,
            &record.sale_count,
            &record.total_amount,
        ));
    }
    table.push_str(&table_row("Total:", &sales, &amount));
    Ok(table)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    employees: &'a [AggregateRecord],
}

#[derive(Deserialize)]
struct OwnedJsonReport {
    employees: Vec<AggregateRecord>,
}

/// `", "` between items and `": "` after keys, as in the exports the tool
/// has always produced.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn render_json(records: &[AggregateRecord]) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    JsonReport { employees: records }.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_xml(records: &[AggregateRecord]) -> String {
    let mut xml = format!("<?xml version=\"1.0\" ?>\n<{}>\n", TABLE_NAME);
    for record in records {
        xml.push_str(&format!(
            "  <row>\n    <id>{}</id>\n    <name>{}</name>\n    <sales>{}</sales>\n    <amount>{}</amount>\n  </row>\n",
            record.id,
            escape_xml(&record.name),
            record.sale_count,
            record.total_amount
        ));
    }
    xml.push_str(&format!("</{}>\n", TABLE_NAME));
    xml
}

fn render_csv(records: &[AggregateRecord]) -> Result<String, ReportError> {
    let mut writer = CSVWriter::new(Vec::new())?;
    for record in records {
        writer.write(record)?;
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()?).into_owned())
}

/// Reads the records back out of a JSON export.
pub fn parse_json_report(json: &str) -> Result<Vec<AggregateRecord>, ReportError> {
    Ok(serde_json::from_str::<OwnedJsonReport>(json)?.employees)
}

/// Reads the records back out of a CSV export.
pub fn parse_csv_report(csv: &str) -> Result<Vec<AggregateRecord>, ReportError> {
    let mut reader = CSVReader::new(csv.as_bytes());
    let records = reader.read().collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}
