use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    #[default]
    Auto,
    Present,
    Absent,
}

pub fn load_run(path: &Path, header: HeaderMode) -> Result<Vec<f64>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::malformed(path, format!("cannot open: {}", e)))?;
    let values = parse_run(reader, path, header)?;
    tracing::debug!(path = %path.display(), values = values.len(), "loaded run");
    Ok(values)
}

pub(crate) fn parse_run<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
    header: HeaderMode,
) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::malformed(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);

        if idx == 0 {
            match header {
                HeaderMode::Present => continue,
                HeaderMode::Auto if !record.get(0).map(is_number).unwrap_or(false) => continue,
                _ => {}
            }
        }

        if record.len() != 1 {
            return Err(Error::malformed(
                path,
                format!("line {}: expected a single column, found {}", line, record.len()),
            ));
        }
        let field = &record[0];
        let value: f64 = field.parse().map_err(|_| {
            Error::malformed(path, format!("line {}: '{}' is not a number", line, field))
        })?;
        if !value.is_finite() {
            return Err(Error::malformed(
                path,
                format!("line {}: non-finite value '{}'", line, field),
            ));
        }
        values.push(value);
    }

    if values.is_empty() {
        return Err(Error::malformed(path, "no values"));
    }
    Ok(values)
}

fn is_number(field: &str) -> bool {
    !field.is_empty() && field.parse::<f64>().is_ok()
}
