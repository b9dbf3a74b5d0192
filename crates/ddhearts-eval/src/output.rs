//! Destinations for evaluated hands.

use std::convert::Infallible;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use ddhearts_core::playout::FIXED_HAND_SIZE;

use crate::evaluator::HandStatistics;
use crate::hands::sort_for_report;

/// Receives each hand's statistics from the collector, in arrival order.
pub trait HandSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn accept(&mut self, stats: &HandStatistics) -> Result<(), Self::Error>;
}

impl HandSink for Vec<HandStatistics> {
    type Error = Infallible;

    fn accept(&mut self, stats: &HandStatistics) -> Result<(), Self::Error> {
        self.push(stats.clone());
        Ok(())
    }
}

/// `Card01..Card10,Avg,Stddev` rows, flushed after every hand so partial runs
/// leave a readable file.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) `path`, making parent directories as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        Self::from_writer(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(header())?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))
    }
}

impl<W: Write> HandSink for CsvSink<W> {
    type Error = csv::Error;

    fn accept(&mut self, stats: &HandStatistics) -> Result<(), Self::Error> {
        let mut cards = stats.hand.clone();
        sort_for_report(&mut cards);

        let mut record: Vec<String> = cards.iter().map(ToString::to_string).collect();
        record.push(stats.mean.to_string());
        record.push(stats.stddev.to_string());
        self.writer.write_record(&record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }
}

fn header() -> Vec<String> {
    (1..=FIXED_HAND_SIZE)
        .map(|index| format!("Card{index:02}"))
        .chain(["Avg".to_string(), "Stddev".to_string()])
        .collect()
}
