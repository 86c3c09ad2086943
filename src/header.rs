//! Locate the real header row in a vendor export.
//!
//! Payroll exports often open with banner lines (company name, report title,
//! run date, blank spacers) before the column headers, so the header offset
//! is scored per line rather than assumed.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{PayfillError, Result};
use crate::schema::normalize;

pub const DEFAULT_SCAN_LINES: usize = 200;

const SNIFF_BYTES: usize = 8192;
const CANDIDATE_DELIMITERS: &[u8] = b",\t;|";

/// Read a file as text, dropping a leading UTF-8 byte-order mark.
///
/// Files that are not valid UTF-8 are decoded as Windows-1252, the usual
/// encoding of spreadsheet-exported CSVs, with a warning naming the file.
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PayfillError::InputNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "not valid UTF-8; decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Physical lines of `text`, split on `\n` with a trailing `\r` removed.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split_terminator('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// Guess the field delimiter from the leading bytes of `text`.
///
/// The winner is the candidate whose most common non-zero per-line count is
/// shared by the most lines; ties go to the earlier candidate. Comma when no
/// candidate appears at all.
pub fn sniff_delimiter(text: &str) -> u8 {
    let mut end = text.len().min(SNIFF_BYTES);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let sample: Vec<&str> = lines(&text[..end]).filter(|l| !l.trim().is_empty()).collect();

    let mut best = (b',', 0usize);
    for &delim in CANDIDATE_DELIMITERS {
        let mut freq: std::collections::BTreeMap<usize, usize> = std::collections::BTreeMap::new();
        for line in &sample {
            let n = line.bytes().filter(|b| *b == delim).count();
            if n > 0 {
                *freq.entry(n).or_default() += 1;
            }
        }
        let consistency = freq.values().copied().max().unwrap_or(0);
        if consistency > best.1 {
            best = (delim, consistency);
        }
    }
    best.0
}

/// Score of one candidate line: expected-name hits, then distinct cells.
fn score_line(line: &str, delimiter: char, expected: &HashSet<String>) -> (usize, usize) {
    let cells: Vec<String> = line
        .split(delimiter)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(normalize)
        .collect();
    let hits = cells.iter().filter(|c| expected.contains(*c)).count();
    let diversity = cells.iter().collect::<HashSet<_>>().len();
    (hits, diversity)
}

/// Zero-based index of the line in `text` that best looks like the header.
pub fn detect_in_text(text: &str, expected_names: &[&str], scan_lines: usize) -> Option<usize> {
    let delimiter = sniff_delimiter(text) as char;
    let expected: HashSet<String> = expected_names.iter().map(|n| normalize(n)).collect();

    let mut best: Option<((usize, usize), usize)> = None;
    for (i, line) in lines(text).enumerate().take(scan_lines) {
        let score = score_line(line, delimiter, &expected);
        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, i));
        }
    }
    if let Some(((hits, diversity), idx)) = best {
        debug!(idx, hits, diversity, "best header candidate");
        return Some(idx);
    }

    // Nothing scored: fall back to the first line with any content.
    lines(text).position(|l| l.split(',').any(|part| !part.trim().is_empty()))
}

/// Zero-based line index of the header row in the file at `path`.
pub fn detect_header_row(path: &Path, expected_names: &[&str], scan_lines: usize) -> Result<usize> {
    let text = read_text(path)?;
    let idx = detect_in_text(&text, expected_names, scan_lines)
        .ok_or_else(|| PayfillError::HeaderNotFound(path.to_path_buf()))?;
    info!(path = %path.display(), line = idx, "detected header row");
    Ok(idx)
}
