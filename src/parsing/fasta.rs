//! Streaming FASTA reader built on noodles.
//!
//! Records are produced one at a time; each record's sequence is exposed as a
//! `BufRead` over the bases with line breaks removed, so a chromosome is never
//! held in memory as a whole.
//!
//! Compression is chosen from the extension:
//! - `.fa`, `.fasta` (uncompressed)
//! - `.gz`, `.bgz` (gzip or bgzip, multi-member streams supported)

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::parsing::ParseError;

const READ_BUFFER_SIZE: usize = 1 << 16;

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// A lazily-read FASTA file.
///
/// Reopening the path restarts the sequence of records; a single source cannot
/// be rewound.
pub struct FastaSource {
    path: PathBuf,
    reader: fasta::io::Reader<Box<dyn BufRead>>,
    definition: String,
}

/// One FASTA record: its name and a reader over its bases
pub struct FastaRecord<'a> {
    /// First word of the definition line, without `>`
    pub name: String,
    path: &'a Path,
    body: Box<dyn BufRead + 'a>,
}

impl<'a> FastaRecord<'a> {
    /// Reader over the record's bases (no line breaks)
    pub fn body(&mut self) -> &mut dyn BufRead {
        &mut self.body
    }

    /// File the record was read from
    #[must_use]
    pub fn path(&self) -> &'a Path {
        self.path
    }
}

impl FastaSource {
    /// Open a FASTA file, decompressing it if the extension says so.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::StreamDecode` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path).map_err(|e| decode_error(path, e))?;

        let inner: Box<dyn BufRead> = if is_gzipped(path) {
            Box::new(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                MultiGzDecoder::new(file),
            ))
        } else {
            Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file))
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader: fasta::io::Reader::new(inner),
            definition: String::new(),
        })
    }

    /// Advance to the next record.
    ///
    /// Whatever the caller left unread of the previous record's body is skipped.
    /// Returns `Ok(None)` at end of file.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::StreamDecode` on I/O or decompression failures.
    pub fn next_record(&mut self) -> Result<Option<FastaRecord<'_>>, ParseError> {
        io::copy(&mut self.reader.sequence_reader(), &mut io::sink())
            .map_err(|e| decode_error(&self.path, e))?;

        self.definition.clear();
        let n = self
            .reader
            .read_definition(&mut self.definition)
            .map_err(|e| decode_error(&self.path, e))?;

        if n == 0 {
            return Ok(None);
        }

        let name = record_name(&self.definition);

        Ok(Some(FastaRecord {
            name,
            path: &self.path,
            body: Box::new(self.reader.sequence_reader()),
        }))
    }
}

/// Extract the record name from a definition line such as `>chr1 some description`
fn record_name(definition: &str) -> String {
    definition
        .trim_end()
        .trim_start_matches('>')
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Wrap an I/O error raised while reading `path`
pub fn decode_error(path: &Path, source: io::Error) -> ParseError {
    ParseError::StreamDecode {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Read, Write};
    use tempfile::NamedTempFile;

    fn read_all(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut source = FastaSource::open(path).unwrap();
        let mut records = Vec::new();
        while let Some(mut record) = source.next_record().unwrap() {
            let mut seq = Vec::new();
            record.body().read_to_end(&mut seq).unwrap();
            records.push((record.name.clone(), seq));
        }
        records
    }

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("human.fa.gz")));
        assert!(is_gzipped(Path::new("HUMAN.FASTA.GZ")));
        assert!(is_gzipped(Path::new("human.fa.bgz")));
        assert!(!is_gzipped(Path::new("human.fa")));
        assert!(!is_gzipped(Path::new("human.fasta")));
    }

    #[test]
    fn test_read_plain_fasta() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b">chr1 description\nACGTACGT\nACGT\n>chr2\nGGGG\n")
            .unwrap();
        temp.flush().unwrap();

        let records = read_all(temp.path());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "chr1");
        assert_eq!(records[0].1, b"ACGTACGTACGT");
        assert_eq!(records[1].0, "chr2");
        assert_eq!(records[1].1, b"GGGG");
    }

    #[test]
    fn test_read_gzipped_fasta() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">chrA\nacgt\nNNNN\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        temp.write_all(&compressed).unwrap();
        temp.flush().unwrap();

        let records = read_all(temp.path());
        assert_eq!(records, vec![("chrA".to_string(), b"acgtNNNN".to_vec())]);
    }

    #[test]
    fn test_unread_body_is_skipped() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b">a\nAAAA\nCCCC\n>b\nTTTT\n").unwrap();
        temp.flush().unwrap();

        let mut source = FastaSource::open(temp.path()).unwrap();
        {
            let first = source.next_record().unwrap().unwrap();
            assert_eq!(first.name, "a");
        }

        let mut second = source.next_record().unwrap().unwrap();
        assert_eq!(second.name, "b");
        let mut seq = Vec::new();
        second.body().read_to_end(&mut seq).unwrap();
        assert_eq!(seq, b"TTTT");
        drop(second);

        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let temp = NamedTempFile::with_suffix(".fa").unwrap();
        let mut source = FastaSource::open(temp.path()).unwrap();
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = FastaSource::open(Path::new("/nonexistent/genome.fa"));
        assert!(matches!(result, Err(ParseError::StreamDecode { .. })));
    }

    #[test]
    fn test_truncated_gzip_is_error() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">chr1\n").unwrap();
        for i in 0..20_000u32 {
            let line = format!("{}\n", ["ACGTTGCA", "GGCATTAC", "TTAGGCAT"][(i % 3) as usize]);
            encoder.write_all(line.as_bytes()).unwrap();
        }
        let compressed = encoder.finish().unwrap();

        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        temp.write_all(&compressed[..compressed.len() / 2]).unwrap();
        temp.flush().unwrap();

        let mut source = FastaSource::open(temp.path()).unwrap();
        let outcome = (|| -> Result<(), ParseError> {
            while let Some(mut record) = source.next_record()? {
                let path = record.path();
                let mut seq = Vec::new();
                record
                    .body()
                    .read_to_end(&mut seq)
                    .map_err(|e| decode_error(path, e))?;
            }
            Ok(())
        })();
        assert!(matches!(outcome, Err(ParseError::StreamDecode { .. })));
    }

    #[test]
    fn test_record_name() {
        assert_eq!(record_name(">chr1 description here"), "chr1");
        assert_eq!(record_name(">chrM\r"), "chrM");
        assert_eq!(record_name(">"), "");
    }
}
