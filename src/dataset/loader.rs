//! CSV loaders for member records and the exercise catalog.

use std::path::Path;

use super::DatasetError;

/// Member records as read from disk; every cell is a trimmed string.
#[derive(Debug, Clone)]
pub struct MemberTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Summary of the auxiliary exercise catalog.
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    pub headers: Vec<String>,
    pub n_rows: usize,
}

impl MemberTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Borrow one column's cells, or `None` if the header is absent.
    ///
    /// Short rows yield empty cells.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// Load member records from a headed CSV file.
pub fn load_members(path: &Path) -> Result<MemberTable, DatasetError> {
    let (headers, rows) = read_csv(path)?;
    Ok(MemberTable { headers, rows })
}

/// Load the exercise catalog. Only its shape is kept.
pub fn load_exercise_catalog(path: &Path) -> Result<ExerciseCatalog, DatasetError> {
    let (headers, rows) = read_csv(path)?;
    Ok(ExerciseCatalog {
        headers,
        n_rows: rows.len(),
    })
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), DatasetError> {
    let csv_error = |source: csv::Error| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(DatasetError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    tracing::debug!(
        "Read {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );
    Ok((headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_trimmed_cells_and_pads_short_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Age, Gender ,Workout_Type").unwrap();
        writeln!(file, " 34 ,Male, Cardio").unwrap();
        writeln!(file, "41,Female").unwrap();

        let table = load_members(file.path()).unwrap();
        assert_eq!(table.headers, vec!["Age", "Gender", "Workout_Type"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("Age").unwrap(), vec!["34", "41"]);
        assert_eq!(table.column("Workout_Type").unwrap(), vec!["Cardio", ""]);
        assert!(table.column("BMI").is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_members(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Csv { .. }));
        assert!(err.to_string().contains("exist.csv"));
    }

    #[test]
    fn catalog_keeps_shape_only() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Name,Body Part").unwrap();
        writeln!(file, "Push-up,Chest").unwrap();
        writeln!(file, "Squat,Legs").unwrap();

        let catalog = load_exercise_catalog(file.path()).unwrap();
        assert_eq!(catalog.headers.len(), 2);
        assert_eq!(catalog.n_rows, 2);
    }
}
