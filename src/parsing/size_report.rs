//! Size report reader and writer.
//!
//! One tab-separated row per genome, in registry order:
//!
//! ```text
//! genome_name  genome_type  num_seqs  unmasked_size  masked_size  total_size  min_len  avg_len  max_len  unmasked_file_bytes  masked_file_bytes
//! ```
//!
//! Sizes are base counts. `masked_size` and `masked_file_bytes` are `NA` for
//! genomes without a hard-masked file.

use std::io::Write;
use std::path::Path;

use crate::core::size::GenomeSizeRecord;
use crate::core::types::GenomeKind;
use crate::parsing::ParseError;
use crate::utils::output::write_atomically;

pub const COLUMNS: [&str; 11] = [
    "genome_name",
    "genome_type",
    "num_seqs",
    "unmasked_size",
    "masked_size",
    "total_size",
    "min_len",
    "avg_len",
    "max_len",
    "unmasked_file_bytes",
    "masked_file_bytes",
];

const MISSING: &str = "NA";

/// Write the report atomically.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be written.
pub fn write_size_report(path: &Path, records: &[GenomeSizeRecord]) -> Result<(), ParseError> {
    write_atomically(path, |w| write_size_report_to(w, records))
}

/// Write the report to any writer.
///
/// # Errors
///
/// Returns `ParseError::Io` on write failure.
pub fn write_size_report_to(
    w: &mut dyn Write,
    records: &[GenomeSizeRecord],
) -> Result<(), ParseError> {
    writeln!(w, "{}", COLUMNS.join("\t"))?;

    for r in records {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.name,
            r.kind,
            r.num_seqs,
            r.unmasked_base_count,
            optional(r.masked_base_count),
            r.total_size_bytes(),
            r.min_len,
            r.avg_len,
            r.max_len,
            r.unmasked_file_bytes,
            optional(r.masked_file_bytes),
        )?;
    }

    Ok(())
}

fn optional(value: Option<u64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// Read a report written by [`write_size_report`].
///
/// # Errors
///
/// Returns `ParseError::SizeReport` if the file cannot be read or is malformed.
pub fn parse_size_report_file(path: &Path) -> Result<Vec<GenomeSizeRecord>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ParseError::SizeReport(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_size_report_text(&content)
}

/// Parse report text. Columns are located by header name.
///
/// # Errors
///
/// Returns `ParseError::SizeReport` on missing columns, bad numbers, or a
/// `total_size` that disagrees with its parts.
pub fn parse_size_report_text(text: &str) -> Result<Vec<GenomeSizeRecord>, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'));

    let Some((_, header)) = lines.next() else {
        return Err(ParseError::SizeReport("empty size report".to_string()));
    };
    let header: Vec<&str> = header.split('\t').map(str::trim).collect();
    let col = |name: &str| {
        header.iter().position(|h| *h == name).ok_or_else(|| {
            ParseError::SizeReport(format!("missing column '{name}'"))
        })
    };
    let idx: Vec<usize> = COLUMNS.iter().map(|c| col(*c)).collect::<Result<_, _>>()?;

    let mut records = Vec::new();
    for (i, line) in lines {
        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let field = |c: usize| {
            fields.get(idx[c]).copied().ok_or_else(|| {
                ParseError::SizeReport(format!("Line {line_num} is missing '{}'", COLUMNS[c]))
            })
        };
        let number = |c: usize| -> Result<u64, ParseError> {
            let raw = field(c)?;
            raw.parse().map_err(|_| {
                ParseError::SizeReport(format!(
                    "Invalid {} on line {line_num}: '{raw}'",
                    COLUMNS[c]
                ))
            })
        };
        let optional_number = |c: usize| -> Result<Option<u64>, ParseError> {
            if field(c)? == MISSING {
                Ok(None)
            } else {
                number(c).map(Some)
            }
        };

        let kind = GenomeKind::parse(field(1)?).ok_or_else(|| {
            ParseError::SizeReport(format!("Invalid genome_type on line {line_num}"))
        })?;

        let record = GenomeSizeRecord {
            name: field(0)?.to_lowercase(),
            kind,
            num_seqs: number(2)?,
            unmasked_base_count: number(3)?,
            masked_base_count: optional_number(4)?,
            min_len: number(6)?,
            avg_len: number(7)?,
            max_len: number(8)?,
            unmasked_file_bytes: number(9)?,
            masked_file_bytes: optional_number(10)?,
        };

        let total = number(5)?;
        if total != record.total_size_bytes() {
            return Err(ParseError::SizeReport(format!(
                "total_size on line {line_num} is {total}, expected {}",
                record.total_size_bytes()
            )));
        }

        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<GenomeSizeRecord> {
        vec![
            GenomeSizeRecord {
                name: "human".to_string(),
                kind: GenomeKind::Both,
                num_seqs: 1,
                unmasked_base_count: 9000,
                masked_base_count: Some(8000),
                min_len: 9000,
                avg_len: 9000,
                max_len: 9000,
                unmasked_file_bytes: 9010,
                masked_file_bytes: Some(8060),
            },
            GenomeSizeRecord {
                name: "yeast".to_string(),
                kind: GenomeKind::UnmaskedOnly,
                num_seqs: 1,
                unmasked_base_count: 50,
                masked_base_count: None,
                min_len: 50,
                avg_len: 50,
                max_len: 50,
                unmasked_file_bytes: 58,
                masked_file_bytes: None,
            },
        ]
    }

    #[test]
    fn test_write_format() {
        let mut out = Vec::new();
        write_size_report_to(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("genome_name\tgenome_type\tnum_seqs\tunmasked_size"));
        assert_eq!(lines[1], "human\tboth\t1\t9000\t8000\t17000\t9000\t9000\t9000\t9010\t8060");
        assert_eq!(lines[2], "yeast\tunmasked\t1\t50\tNA\t50\t50\t50\t50\t58\tNA");
    }

    #[test]
    fn test_read_back() {
        let mut out = Vec::new();
        write_size_report_to(&mut out, &sample()).unwrap();
        let parsed = parse_size_report_text(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_columns_may_be_reordered() {
        let text = "total_size\tgenome_name\tgenome_type\tnum_seqs\tunmasked_size\tmasked_size\tmin_len\tavg_len\tmax_len\tunmasked_file_bytes\tmasked_file_bytes\n\
                    30\tmouse\tboth\t2\t20\t10\t5\t10\t15\t100\t90\n";
        let parsed = parse_size_report_text(text).unwrap();
        assert_eq!(parsed[0].name, "mouse");
        assert_eq!(parsed[0].total_size_bytes(), 30);
    }

    #[test]
    fn test_rejects_inconsistent_total() {
        let text = format!(
            "{}\nhuman\tboth\t1\t9000\t8000\t1\t9000\t9000\t9000\t9010\t8060\n",
            COLUMNS.join("\t")
        );
        let err = parse_size_report_text(&text).unwrap_err();
        assert!(err.to_string().contains("total_size"));
    }

    #[test]
    fn test_rejects_missing_column() {
        let err = parse_size_report_text("genome_name\tgenome_type\nhuman\tboth\n").unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn test_rejects_bad_number() {
        let text = format!(
            "{}\nhuman\tboth\tmany\t9000\t8000\t17000\t9000\t9000\t9000\t9010\t8060\n",
            COLUMNS.join("\t")
        );
        let err = parse_size_report_text(&text).unwrap_err();
        assert!(err.to_string().contains("num_seqs"));
    }
}
