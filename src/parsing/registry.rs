use std::collections::HashSet;
use std::path::Path;

use crate::core::genome::GenomeEntry;
use crate::core::types::GenomeKind;
use crate::parsing::ParseError;

/// Parse the genome registry TSV.
///
/// # Errors
///
/// Returns `ParseError::Registry` if the file is missing, unreadable or malformed.
pub fn parse_registry_file(path: &Path) -> Result<Vec<GenomeEntry>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ParseError::Registry(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_registry_text(&content)
}

/// Parse registry text: a header row naming `genome_name` and `genome_type`,
/// then one genome per line.
///
/// The name column defaults to the first column when no `genome_name` header is
/// present. Extra columns are ignored.
///
/// # Errors
///
/// Returns `ParseError::Registry` on a missing header or `genome_type` column,
/// short lines, unknown genome types, duplicate names, or an empty registry.
pub fn parse_registry_text(text: &str) -> Result<Vec<GenomeEntry>, ParseError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut columns: Option<(usize, usize)> = None;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        let Some((name_col, type_col)) = columns else {
            columns = Some(header_columns(&fields)?);
            continue;
        };

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let (Some(name), Some(kind)) = (fields.get(name_col), fields.get(type_col)) else {
            return Err(ParseError::Registry(format!(
                "Line {line_num} has fewer than {} fields",
                name_col.max(type_col) + 1
            )));
        };

        if name.is_empty() {
            return Err(ParseError::Registry(format!(
                "Line {line_num} has an empty genome name"
            )));
        }

        let kind = GenomeKind::parse(kind).ok_or_else(|| {
            ParseError::Registry(format!(
                "Invalid genome_type on line {line_num}: '{kind}' (expected 'both' or 'unmasked')"
            ))
        })?;

        let entry = GenomeEntry::new(name, kind);
        if !seen.insert(entry.name.clone()) {
            return Err(ParseError::Registry(format!(
                "Duplicate genome '{}' on line {line_num}",
                entry.name
            )));
        }

        entries.push(entry);
    }

    if columns.is_none() {
        return Err(ParseError::Registry("missing header row".to_string()));
    }

    if entries.is_empty() {
        return Err(ParseError::Registry("no genomes listed".to_string()));
    }

    Ok(entries)
}

fn header_columns(fields: &[&str]) -> Result<(usize, usize), ParseError> {
    let position = |wanted: &str| fields.iter().position(|f| f.eq_ignore_ascii_case(wanted));

    let type_col = position("genome_type").ok_or_else(|| {
        ParseError::Registry("header row has no 'genome_type' column".to_string())
    })?;
    let name_col = position("genome_name").unwrap_or(0);

    if name_col == type_col {
        return Err(ParseError::Registry(
            "header row has no 'genome_name' column".to_string(),
        ));
    }

    Ok((name_col, type_col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry_text() {
        let tsv = "genome_name\tgenome_type\nHuman\tboth\nyeast\tunmasked\n";

        let entries = parse_registry_text(tsv).unwrap();
        assert_eq!(
            entries,
            vec![
                GenomeEntry::new("human", GenomeKind::Both),
                GenomeEntry::new("yeast", GenomeKind::UnmaskedOnly),
            ]
        );
    }

    #[test]
    fn test_columns_found_by_header() {
        let tsv = "# registry\n\ngenome_type\tnote\tgenome_name\nboth\tprimary\tmouse\n";

        let entries = parse_registry_text(tsv).unwrap();
        assert_eq!(entries, vec![GenomeEntry::new("mouse", GenomeKind::Both)]);
    }

    #[test]
    fn test_first_column_is_default_name() {
        let tsv = "species\tgenome_type\nzebrafish\tunmasked\n";

        let entries = parse_registry_text(tsv).unwrap();
        assert_eq!(entries[0].name, "zebrafish");
    }

    #[test]
    fn test_order_is_preserved() {
        let tsv = "genome_name\tgenome_type\nc\tboth\na\tboth\nb\tunmasked\n";

        let names: Vec<String> = parse_registry_text(tsv)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_rejects_unknown_type() {
        let tsv = "genome_name\tgenome_type\nhuman\tsoftmasked\n";
        let err = parse_registry_text(tsv).unwrap_err();
        assert!(err.to_string().contains("softmasked"));
    }

    #[test]
    fn test_rejects_duplicates_case_insensitively() {
        let tsv = "genome_name\tgenome_type\nhuman\tboth\nHUMAN\tunmasked\n";
        let err = parse_registry_text(tsv).unwrap_err();
        assert!(err.to_string().contains("Duplicate genome 'human'"));
    }

    #[test]
    fn test_rejects_missing_type_column() {
        let tsv = "genome_name\tkind\nhuman\tboth\n";
        assert!(matches!(
            parse_registry_text(tsv),
            Err(ParseError::Registry(_))
        ));
    }

    #[test]
    fn test_rejects_short_line() {
        let tsv = "genome_name\tgenome_type\nhuman\n";
        let err = parse_registry_text(tsv).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_rejects_empty_registry() {
        assert!(parse_registry_text("").is_err());
        assert!(parse_registry_text("genome_name\tgenome_type\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = parse_registry_file(Path::new("/nonexistent/genomes.tsv"));
        assert!(matches!(result, Err(ParseError::Registry(_))));
    }
}
