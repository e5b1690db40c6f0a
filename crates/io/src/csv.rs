// Delimited text ingest (CSV/TSV)

use std::io::Read;
use std::path::Path;

use rowdeck_engine::row::{Column, Row, RowId, Schema};

/// Parsed dataset: schema (header order + numeric flags) and rows with
/// stable ids assigned from their 1-based data line position.
#[derive(Debug)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

pub fn import(path: &Path) -> Result<Dataset, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
        .map_err(|e| format!("could not parse {}: {}", path.display(), e))
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Dataset, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
        .map_err(|e| format!("could not parse {}: {}", path.display(), e))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text: the header line defines columns, subsequent
/// non-blank lines are zipped against the headers (missing fields read as
/// empty, extra fields are dropped). Row ids come from the 1-based data line
/// position, so blank lines leave gaps rather than renumbering.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Dataset, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(result) => result
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Err("empty input".to_string()),
    };
    if headers.is_empty() {
        return Err("empty input".to_string());
    }

    let mut rows: Vec<Row> = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;

        // Whitespace-only lines are blank; lines of bare delimiters are not
        if record.len() <= 1 && record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        // Header is line 1, so the 1-based data position is line - 1
        let id = record
            .position()
            .map(|p| p.line().saturating_sub(1))
            .unwrap_or(rows.len() as u64 + 1);

        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = record.get(i).map(|v| v.trim()).unwrap_or("");
                (header.clone(), value.to_string())
            })
            .collect::<Vec<_>>();
        rows.push(Row::with_fields(RowId(id), fields));
    }

    let schema = sniff_schema(&headers, &rows);
    Ok(Dataset { schema, rows })
}

/// Mark a column numeric iff it has at least one non-blank value and every
/// non-blank value parses as an integer. Numeric columns sort by value
/// instead of lexicographically.
fn sniff_schema(headers: &[String], rows: &[Row]) -> Schema {
    let columns = headers
        .iter()
        .map(|header| {
            let mut any = false;
            let all_numeric = rows.iter().all(|row| {
                let value = row.get(header).trim();
                if value.is_empty() {
                    return true;
                }
                any = true;
                value.parse::<i64>().is_ok()
            });
            if any && all_numeric {
                Column::numeric(header.clone())
            } else {
                Column::text(header.clone())
            }
        })
        .collect();
    Schema::new(columns)
}
