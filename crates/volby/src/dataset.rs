use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::types::MunicipalityRecord;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Municipality records of one district in discovery order.
///
/// The first record decides the columns of tabular output: later records
/// lose keys the header lacks and get empty cells for keys they lack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<MunicipalityRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MunicipalityRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MunicipalityRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MunicipalityRecord> {
        self.records
    }

    pub fn header(&self) -> Vec<&str> {
        self.records
            .first()
            .map(|first| first.keys().collect())
            .unwrap_or_default()
    }

    /// Records projected onto [`Self::header`].
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> {
        let header = self.header();
        self.records.iter().map(move |record| {
            header
                .iter()
                .map(|column| record.get(column).unwrap_or(""))
                .collect()
        })
    }

    /// Header row followed by one row per record. Nothing is written for an
    /// empty dataset.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), OutputError> {
        let mut wtr = csv::Writer::from_writer(writer);

        if !self.is_empty() {
            wtr.write_record(self.header())?;
        }
        for row in self.rows() {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), OutputError> {
        let mut writer = writer;
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        self.write_csv(BufWriter::new(File::create(path)?))
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<MunicipalityRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = MunicipalityRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = MunicipalityRecord;
    type IntoIter = std::vec::IntoIter<MunicipalityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
