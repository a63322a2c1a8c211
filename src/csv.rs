use std::fmt::{Display, Formatter};
use std::io;

use serde::{Deserialize, Serialize, Serializer};

use crate::numeric::CurrencyAmount;
use crate::store::AggregateRecord;

/// Column headers of the CSV export, in order.
pub const CSV_HEADER: [&str; 4] = ["ID", "Name", "Number of Sales", "Total Amount ($)"];

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
struct CSVEntry {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Number of Sales")]
    sales: u32,
    #[serde(rename = "Total Amount ($)", serialize_with = "amount_as_text")]
    amount: CurrencyAmount,
}

/// Writes the amount as displayed (`6.0`, `9.67`), never in float notation.
fn amount_as_text<S>(amount: &CurrencyAmount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(amount)
}

impl From<&AggregateRecord> for CSVEntry {
    fn from(record: &AggregateRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            sales: record.sale_count,
            amount: record.total_amount,
        }
    }
}

impl From<CSVEntry> for AggregateRecord {
    fn from(value: CSVEntry) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sale_count: value.sales,
            total_amount: value.amount,
        }
    }
}

/// A CSV row could not be read back into an aggregate row.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CSVReaderError {
    /// Malformed CSV or a field of the wrong type.
    CSVParseError(String),
}

impl Display for CSVReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            CSVReaderError::CSVParseError(err) => format!("CSV parse error: {}", err),
        })
    }
}

/// Writing CSV to the underlying writer failed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CSVWriterError {
    /// Error reported by the CSV writer or the I/O below it.
    CSVWriteError(String),
}

impl Display for CSVWriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            CSVWriterError::CSVWriteError(err) => format!("CSV write error: {}", err),
        })
    }
}

/// Reads aggregate rows back from a CSV export.
pub struct CSVReader<R: io::Read> {
    reader: ::csv::Reader<R>,
}

impl<R: io::Read> CSVReader<R> {
    /// Reads from `reader`, expecting the header row first.
    pub fn new(reader: R) -> Self {
        Self {
            reader: ::csv::ReaderBuilder::new()
                .has_headers(true)
                .from_reader(reader),
        }
    }

    /// Yields one result per data row, so a bad row does not stop the rest.
    pub fn read(&mut self) -> impl Iterator<Item = Result<AggregateRecord, CSVReaderError>> + '_ {
        self.reader.deserialize::<CSVEntry>().map(|entry_result| {
            entry_result
                .map(AggregateRecord::from)
                .map_err(|err| CSVReaderError::CSVParseError(format!("{}", err)))
        })
    }
}

/// Writes aggregate rows as CSV: the fixed header first, CRLF line endings,
/// quoting only where a field needs it.
pub struct CSVWriter<W: io::Write> {
    writer: ::csv::Writer<W>,
}

impl<W: io::Write> CSVWriter<W> {
    /// Starts a CSV document on `writer` by writing the header row.
    pub fn new(writer: W) -> Result<Self, CSVWriterError> {
        let mut writer = Self {
            writer: ::csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(::csv::Terminator::CRLF)
                .from_writer(writer),
        };
        writer.write_fields(&CSV_HEADER)?;
        Ok(writer)
    }

    /// Appends one data row.
    pub fn write(&mut self, record: &AggregateRecord) -> Result<(), CSVWriterError> {
        self.writer
            .serialize(CSVEntry::from(record))
            .map_err(|err| CSVWriterError::CSVWriteError(format!("{}", err)))
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W, CSVWriterError> {
        self.writer
            .into_inner()
            .map_err(|err| CSVWriterError::CSVWriteError(format!("{}", err)))
    }

    fn write_fields(&mut self, fields: &[&str]) -> Result<(), CSVWriterError> {
        self.writer
            .write_record(fields)
            .map_err(|err| CSVWriterError::CSVWriteError(format!("{}", err)))
    }
}
