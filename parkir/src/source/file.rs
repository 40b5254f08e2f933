use csv::ReaderBuilder;
use parkir_base::Sample;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

use super::SourceError;

/// One row of the historical CSV export. Columns are matched by name, extra ones are ignored.
#[derive(Debug, Deserialize)]
struct Record {
    jam: i64,
    hari: i64,
    kepadatan: String,
}

pub fn read<R: Read>(reader: R) -> Result<Vec<Sample>, SourceError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut samples = Vec::new();
    for (idx, record) in reader.deserialize::<Record>().enumerate() {
        let record = record?;
        let sample = Sample::from_raw(record.jam, record.hari, &record.kepadatan)
            .map_err(|source| SourceError::Row {
                row: idx + 1,
                source,
            })?;
        samples.push(sample);
    }
    Ok(samples)
}

pub fn read_path(path: &Path) -> Result<Vec<Sample>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read(file)
}
