// CSV table import/export

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use pkgmatch_recon::Table;

const UTF8_BOM: &str = "\u{feff}";

/// Read a headed CSV file into a [`Table`] whose source is the file path.
pub fn read_table(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    read_table_from_str(&path.display().to_string(), &content)
}

/// Parse headed CSV text. Records shorter or longer than the header are kept as-is.
pub fn read_table_from_str(source: &str, content: &str) -> Result<Table, String> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("{source}: {e}"))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("{source}: {e}"))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(Table::new(source, headers, rows))
}

/// Read file and convert to UTF-8 if needed (handles a leading BOM, Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8; decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Write `headers` then one row per serialized record.
///
/// The header is written even when `records` is empty.
pub fn write_records<T: Serialize>(path: &Path, headers: &[&str], records: &[T]) -> Result<(), String> {
    let err = |e: csv::Error| format!("cannot write {}: {e}", path.display());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(err)?;

    writer.write_record(headers).map_err(err)?;
    for record in records {
        writer.serialize(record).map_err(err)?;
    }

    writer
        .flush()
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    Ok(())
}

/// Write raw rows under `headers`, padding short rows and cutting long ones to the header width.
pub fn write_rows(path: &Path, headers: &[String], rows: &[&[String]]) -> Result<(), String> {
    let err = |e: csv::Error| format!("cannot write {}: {e}", path.display());
    let mut writer = csv::WriterBuilder::new().from_path(path).map_err(err)?;

    writer.write_record(headers).map_err(err)?;
    let width = headers.len();
    for row in rows {
        let fields = (0..width).map(|i| row.get(i).map(String::as_str).unwrap_or(""));
        writer.write_record(fields).map_err(err)?;
    }

    writer
        .flush()
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    Ok(())
}
