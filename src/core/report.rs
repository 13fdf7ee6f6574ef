//! Report generation - Writes movement summaries to CSV, JSON or PDF.
//!
//! Every format implements [`Report`]. A report receives a snapshot of movements and a
//! cutoff date and emits only the movements dated strictly after the cutoff, in the
//! order it was given. The session hands reports the full unfiltered ledger (see
//! [`crate::core::session::LedgerSession::export_report`]).

use crate::{
    core::{filter::Filter, movement::Movement},
    errors::ReportError,
};
use chrono::{Months, NaiveDate};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Report cutoff for a filter: reports include movements strictly after this date.
///
/// Reports count calendar months and years back from `today`, unlike the rolling
/// windows used for the on-screen view. [`Filter::All`] yields the day before the epoch.
#[must_use]
pub fn cutoff_for(filter: Filter, today: NaiveDate) -> NaiveDate {
    let before_epoch = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap_or(NaiveDate::MIN);
    let cutoff = match filter {
        Filter::All => None,
        Filter::LastMonth => today.checked_sub_months(Months::new(1)),
        Filter::LastYear => today.checked_sub_months(Months::new(12)),
    };
    cutoff.unwrap_or(before_epoch)
}

/// A report format.
pub trait Report {
    /// File extension for this format, without the leading dot.
    fn extension(&self) -> &'static str;

    /// Writes every movement dated after `cutoff` to `destination`.
    ///
    /// # Returns
    /// The number of movements written
    fn export(
        &self,
        movements: &[Movement],
        cutoff: NaiveDate,
        destination: &mut dyn Write,
    ) -> Result<usize, ReportError>;
}

/// Movements that belong in a report with this cutoff.
fn after_cutoff(movements: &[Movement], cutoff: NaiveDate) -> impl Iterator<Item = &Movement> {
    movements.iter().filter(move |m| m.date > cutoff)
}

/// Comma-separated report with a `Date,Concept,Amount` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReport;

impl Report for CsvReport {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn export(
        &self,
        movements: &[Movement],
        cutoff: NaiveDate,
        destination: &mut dyn Write,
    ) -> Result<usize, ReportError> {
        let mut writer = csv::Writer::from_writer(destination);
        writer.write_record(["Date", "Concept", "Amount"])?;

        let mut written = 0;
        for movement in after_cutoff(movements, cutoff) {
            writer.write_record([
                movement.date.format("%Y-%m-%d").to_string(),
                movement.concept.clone(),
                format!("{:.2}", movement.amount),
            ])?;
            written += 1;
        }

        writer.flush()?;
        Ok(written)
    }
}

/// Pretty-printed JSON summary carrying the cutoff and the total of the listed movements.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

#[derive(Serialize)]
struct JsonSummary<'a> {
    cutoff: NaiveDate,
    total: f64,
    movements: Vec<&'a Movement>,
}

impl Report for JsonReport {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn export(
        &self,
        movements: &[Movement],
        cutoff: NaiveDate,
        destination: &mut dyn Write,
    ) -> Result<usize, ReportError> {
        let listed: Vec<&Movement> = after_cutoff(movements, cutoff).collect();
        let summary = JsonSummary {
            cutoff,
            total: listed.iter().fold(0.0, |total, m| total + m.amount),
            movements: listed,
        };

        serde_json::to_writer_pretty(&mut *destination, &summary)?;
        writeln!(destination)?;
        Ok(summary.movements.len())
    }
}

/// A4 document listing the movements after the cutoff, followed by their total.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReport;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const FONT_SIZE: f32 = 11.0;
const LAYER: &str = "Movements";

/// Writes lines top to bottom, starting a new page when the current one is full.
struct PdfCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    y: f32,
}

impl PdfCursor<'_> {
    fn row(&mut self, columns: [(&str, f32); 3]) {
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT.0 - MARGIN;
        }
        for (text, x) in columns {
            if !text.is_empty() {
                self.layer
                    .use_text(text, FONT_SIZE, Mm(x), Mm(self.y), &self.font);
            }
        }
        self.y -= LINE_HEIGHT;
    }
}

fn pdf_error(error: impl fmt::Display) -> ReportError {
    ReportError::Pdf {
        message: error.to_string(),
    }
}

impl Report for PdfReport {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn export(
        &self,
        movements: &[Movement],
        cutoff: NaiveDate,
        destination: &mut dyn Write,
    ) -> Result<usize, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new("DAMWallet report", PAGE_WIDTH, PAGE_HEIGHT, LAYER);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let written = {
            let mut cursor = PdfCursor {
                doc: &doc,
                layer: doc.get_page(page).get_layer(layer),
                font,
                y: PAGE_HEIGHT.0 - MARGIN,
            };

            let title = format!("Movements after {cutoff}");
            cursor.row([(title.as_str(), MARGIN), ("", 0.0), ("", 0.0)]);
            cursor.row([("Date", MARGIN), ("Concept", 55.0), ("Amount", 150.0)]);

            let mut written = 0;
            let mut total = 0.0;
            for movement in after_cutoff(movements, cutoff) {
                let date = movement.date.format("%Y-%m-%d").to_string();
                let amount = format_amount(movement.amount);
                cursor.row([
                    (date.as_str(), MARGIN),
                    (movement.concept.as_str(), 55.0),
                    (amount.as_str(), 150.0),
                ]);
                total += movement.amount;
                written += 1;
            }

            let total = format!("{total:.2}");
            cursor.row([("Total", MARGIN), ("", 0.0), (total.as_str(), 150.0)]);
            written
        };

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;
        destination.write_all(&bytes)?;
        Ok(written)
    }
}

/// Formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// [`CsvReport`]
    Csv,
    /// [`JsonReport`]
    Json,
    /// [`PdfReport`]
    Pdf,
}

impl ReportFormat {
    /// Writer for this format.
    #[must_use]
    pub fn report(self) -> Box<dyn Report> {
        match self {
            Self::Csv => Box::new(CsvReport),
            Self::Json => Box::new(JsonReport),
            Self::Pdf => Box::new(PdfReport),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!(
                "unknown report format '{other}', expected csv, json or pdf"
            )),
        }
    }
}

/// Formats an amount with its sign and two decimals, like `+1500.00` or `-650.00`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    if amount >= 0.0 {
        format!("+{amount:.2}")
    } else {
        format!("-{:.2}", amount.abs())
    }
}

/// One-line summary of a movement: `#id  date  concept  amount`.
#[must_use]
pub fn format_movement_line(movement: &Movement) -> String {
    format!(
        "#{:<5} {}  {:<25}  {:>14}",
        movement.id,
        movement.date,
        movement.concept,
        format_amount(movement.amount)
    )
}
