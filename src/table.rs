//! Reading the download list out of a loosely formatted table export.
//!
//! A table is plain text with a header row. Depending on where it was exported
//! from, each physical line may carry an ordinal index followed by a pipe
//! (`7|https://...,clip.mp4`), and fields are separated either by commas or by
//! pipes. [`TableFormat`] names the two knobs; everything after that is shared.

use crate::error::{ParseError, SchemaError, TableError};
use log::debug;

/// The column holding the source URL.
pub const LINK_COLUMN: &str = "link";
/// The column holding the output file name.
pub const FILE_COLUMN: &str = "file";

const INDEX_SEPARATOR: char = '|';
const QUOTE: char = '"';

/// How the lines of a table are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    /// The character between two fields.
    pub delimiter: char,
    /// Whether each line may start with `<index>|`, dropped before splitting.
    pub index_prefix: bool,
}

impl TableFormat {
    /// Comma separated fields, each line optionally prefixed with `<index>|`.
    pub const INDEXED_CSV: TableFormat = TableFormat {
        delimiter: ',',
        index_prefix: true,
    };

    /// Pipe separated fields, no index prefix.
    pub const PIPE: TableFormat = TableFormat {
        delimiter: '|',
        index_prefix: false,
    };
}

impl Default for TableFormat {
    fn default() -> Self {
        Self::INDEXED_CSV
    }
}

/// One download: where from, and the exact name to save it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub url: String,
    pub filename: String,
}

/// A table split into a normalised header and its data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Position of a column in the header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    /// The rows that name both a URL and a file, in table order.
    ///
    /// Rows with an empty `link` or `file` are skipped, not reported as errors.
    /// Returns an empty list when either column is missing; call [`validate`] first.
    pub fn source_rows(&self) -> Vec<SourceRow> {
        let (Some(link), Some(file)) = (self.column(LINK_COLUMN), self.column(FILE_COLUMN)) else {
            return Vec::new();
        };

        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let url = row.get(link).map(String::as_str).unwrap_or_default();
                let filename = row.get(file).map(String::as_str).unwrap_or_default();

                if url.is_empty() || filename.is_empty() {
                    debug!("Skipping data row {} with an empty link or file", index + 1);
                    return None;
                }

                Some(SourceRow {
                    url: url.to_string(),
                    filename: filename.to_string(),
                })
            })
            .collect()
    }
}

/// Drops the `<index>|` prefix from every line that has one.
///
/// Returns a new line sequence; the input is left untouched.
pub fn clean_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(|line| match line.split_once(INDEX_SEPARATOR) {
            Some((_, rest)) => rest,
            None => line,
        })
        .collect()
}

/// Parses a table into its header and rows.
///
/// Header names and field values are trimmed and stripped of `"` characters.
/// Blank lines are ignored.
///
/// # Errors
///
/// Fails on structural problems only: no header, an unterminated quote, or a
/// row with more fields than the header.
pub fn parse(raw: &str, format: &TableFormat) -> Result<ParsedTable, ParseError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let lines: Vec<&str> = if format.index_prefix {
        clean_lines(raw)
    } else {
        raw.lines().collect()
    };

    let mut records = lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = records.next().ok_or(ParseError::MissingHeader)?;
    let header = split_fields(header, format.delimiter, header_line)?;

    let mut rows = Vec::new();
    for (line, text) in records {
        let mut fields = split_fields(text, format.delimiter, line)?;
        if fields.len() > header.len() {
            return Err(ParseError::FieldCount {
                line,
                expected: header.len(),
                found: fields.len(),
            });
        }
        fields.resize(header.len(), String::new());
        rows.push(fields);
    }

    Ok(ParsedTable { header, rows })
}

/// Checks that the columns the downloader reads are present.
///
/// # Errors
///
/// [`SchemaError::MissingColumn`] naming the first absent column.
pub fn validate(table: &ParsedTable) -> Result<(), SchemaError> {
    for required in [LINK_COLUMN, FILE_COLUMN] {
        if table.column(required).is_none() {
            return Err(SchemaError::MissingColumn(required));
        }
    }
    Ok(())
}

/// Parses and validates a table.
///
/// # Errors
///
/// Any [`ParseError`] or [`SchemaError`]; the whole table should then be skipped.
pub fn load(raw: &str, format: &TableFormat) -> Result<ParsedTable, TableError> {
    let table = parse(raw, format)?;
    validate(&table)?;
    Ok(table)
}

fn split_fields(line: &str, delimiter: char, line_number: usize) -> Result<Vec<String>, ParseError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if quoted {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.push(QUOTE);
                } else {
                    quoted = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        if c == delimiter {
            fields.push(normalize(&field));
            field.clear();
            at_field_start = true;
            continue;
        }

        if c == QUOTE && at_field_start && field.trim().is_empty() {
            quoted = true;
            field.clear();
        } else {
            field.push(c);
        }
        at_field_start = at_field_start && c.is_whitespace();
    }

    if quoted {
        return Err(ParseError::UnterminatedQuote { line: line_number });
    }
    fields.push(normalize(&field));

    Ok(fields)
}

fn normalize(field: &str) -> String {
    field.trim().replace(QUOTE, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str, filename: &str) -> SourceRow {
        SourceRow {
            url: url.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_index_prefix_is_stripped_before_splitting() {
        let raw = "link,file\n7|https://x,name.mp4\n";

        let rows = load(raw, &TableFormat::INDEXED_CSV).unwrap().source_rows();

        assert_eq!(rows, vec![row("https://x", "name.mp4")]);
    }

    #[test]
    fn test_prefixed_header_and_quoted_columns() {
        let raw = "0|\"link\", \"file\" \r\n1|\"https://a\",\"a.mp4\"\r\n2| https://b , b.mp4\r\n";

        let rows = load(raw, &TableFormat::INDEXED_CSV).unwrap().source_rows();

        assert_eq!(rows, vec![row("https://a", "a.mp4"), row("https://b", "b.mp4")]);
    }

    #[test]
    fn test_only_first_pipe_is_treated_as_index() {
        assert_eq!(clean_lines("3|a|b\nplain"), vec!["a|b", "plain"]);
    }

    #[test]
    fn test_pipe_format_splits_on_pipes_without_index() {
        let raw = "\"link\"|\"file\"\n\"https://x?a=1,2\"|\"clip, part 1.mp4\"\n";

        let rows = load(raw, &TableFormat::PIPE).unwrap().source_rows();

        assert_eq!(rows, vec![row("https://x?a=1,2", "clip, part 1.mp4")]);
    }

    #[test]
    fn test_column_order_is_irrelevant() {
        let raw = "title,file,link\nIntro,intro.mp4,https://i\n";

        let rows = load(raw, &TableFormat::INDEXED_CSV).unwrap().source_rows();

        assert_eq!(rows, vec![row("https://i", "intro.mp4")]);
    }

    #[test]
    fn test_quoted_field_keeps_delimiter() {
        let table = parse("link,file\n\"https://x?a=1,2\",out.mp4\n", &TableFormat::INDEXED_CSV)
            .unwrap();

        assert_eq!(table.rows, vec![vec!["https://x?a=1,2", "out.mp4"]]);
    }

    #[test]
    fn test_doubled_quotes_are_stripped_from_values() {
        let table = parse("link,file\n\"say \"\"hi\"\"\",hi.mp4\n", &TableFormat::INDEXED_CSV)
            .unwrap();

        assert_eq!(table.rows[0][0], "say hi");
    }

    #[test]
    fn test_rows_with_empty_fields_are_skipped() {
        let raw = "link,file\nhttps://a,\n,b.mp4\n\"\",\"\"\nhttps://c\nhttps://d,d.mp4\n";

        let rows = load(raw, &TableFormat::INDEXED_CSV).unwrap().source_rows();

        assert_eq!(rows, vec![row("https://d", "d.mp4")]);
    }

    #[test]
    fn test_blank_lines_and_bom_are_ignored() {
        let raw = "\u{feff}link,file\n\n   \nhttps://a,a.mp4\n";

        let rows = load(raw, &TableFormat::INDEXED_CSV).unwrap().source_rows();

        assert_eq!(rows, vec![row("https://a", "a.mp4")]);
    }

    #[test]
    fn test_missing_file_column_is_rejected() {
        let raw = "link,name\nhttps://a,a.mp4\n";

        assert!(matches!(
            load(raw, &TableFormat::INDEXED_CSV),
            Err(TableError::Schema(SchemaError::MissingColumn("file")))
        ));
    }

    #[test]
    fn test_missing_link_column_is_rejected() {
        let table = parse("url,file\n", &TableFormat::INDEXED_CSV).unwrap();

        assert_eq!(validate(&table), Err(SchemaError::MissingColumn("link")));
        assert!(table.source_rows().is_empty());
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let table = parse("Link,File\n", &TableFormat::INDEXED_CSV).unwrap();

        assert!(validate(&table).is_err());
    }

    #[test]
    fn test_unterminated_quote_is_a_parse_error() {
        let err = parse("link,file\n\"https://a,a.mp4\n", &TableFormat::INDEXED_CSV).unwrap_err();

        assert_eq!(err, ParseError::UnterminatedQuote { line: 2 });
    }

    #[test]
    fn test_extra_fields_are_a_parse_error() {
        let err = parse("link,file\n\nhttps://a,a.mp4,extra\n", &TableFormat::INDEXED_CSV)
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::FieldCount {
                line: 3,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert_eq!(
            parse(" \n\n", &TableFormat::PIPE),
            Err(ParseError::MissingHeader)
        );
    }
}
