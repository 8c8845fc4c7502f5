use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::DataErr;

/// A numeric table read from a CSV file. The last column is the label.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    features: Vec<f32>,
    labels: Vec<f32>,
}

impl Table {
    /// Feature column names, the label column excluded.
    pub fn feature_names(&self) -> &[String] {
        &self.header[..self.header.len() - 1]
    }

    pub fn num_features(&self) -> usize {
        self.header.len() - 1
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row-major feature values.
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Appends the rows of `other` after the rows of `self`.
    ///
    /// # Errors
    /// `DataErr::HeaderMismatch` if both tables do not have the same columns.
    pub fn merge(mut self, other: Table) -> Result<Table, DataErr> {
        if self.header != other.header {
            return Err(DataErr::HeaderMismatch {
                expected: self.header,
                got: other.header,
            });
        }

        self.features.extend(other.features);
        self.labels.extend(other.labels);
        Ok(self)
    }

    pub(crate) fn into_parts(self) -> (Vec<f32>, Vec<f32>) {
        (self.features, self.labels)
    }
}

/// Loads the CSV file at `path`.
///
/// The first record is the header, every field must be numeric. Empty feature
/// fields are read as missing values.
pub fn load_csv(path: &Path) -> Result<Table, DataErr> {
    let file = File::open(path).map_err(|e| DataErr::Csv(e.into()))?;
    let table = read_csv(file, path)?;

    debug!(
        rows = table.len(),
        features = table.num_features();
        "loaded {}", path.display()
    );
    Ok(table)
}

/// Reads a CSV document from `reader`, `path` is only used in errors.
pub fn read_csv<R: Read>(reader: R, path: &Path) -> Result<Table, DataErr> {
    let empty = || DataErr::Empty {
        path: PathBuf::from(path),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.len() < 2 {
        return Err(empty());
    }

    let num_features = header.len() - 1;
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        for (column, field) in header.iter().zip(record.iter()).take(num_features) {
            let value = if field.is_empty() {
                f32::NAN
            } else {
                parse(field, path, row, column)?
            };
            features.push(value);
        }

        let label = match record.get(num_features) {
            Some(field) if !field.is_empty() => parse(field, path, row, &header[num_features])?,
            _ => return Err(DataErr::MissingLabel { row }),
        };
        labels.push(label);
    }

    if labels.is_empty() {
        return Err(empty());
    }

    Ok(Table {
        header,
        features,
        labels,
    })
}

fn parse(field: &str, path: &Path, row: usize, column: &str) -> Result<f32, DataErr> {
    field.parse().map_err(|_| DataErr::NonNumeric {
        path: PathBuf::from(path),
        row,
        column: column.to_string(),
        value: field.to_string(),
    })
}
