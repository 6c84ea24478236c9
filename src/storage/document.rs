// src/storage/document.rs
use chrono::NaiveDateTime;

use crate::edgar::models::{Filing, Timestamp, CANONICAL_TIMESTAMP_FORMAT};
use crate::utils::error::StorageError;

/// Markdown table header row.
pub const TABLE_HEADER: &str = "|Company|Timestamp|Link|";
/// Markdown table separator; every line after it is a filing row.
pub const TABLE_SEPARATOR: &str = "|---|---|---|";
/// Lines in the rendered header, used when the separator can't be found.
const HEADER_LINE_COUNT: usize = 5;

/// Preamble written above the filing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub item: String,
    pub checked_at: NaiveDateTime,
}

impl DocumentHeader {
    pub fn new(item: impl Into<String>, checked_at: NaiveDateTime) -> Self {
        Self {
            item: item.into(),
            checked_at,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "# List of Form 8-Ks with item {}\nLast checked {}\n\n{}\n{}\n",
            self.item,
            self.checked_at.format(CANONICAL_TIMESTAMP_FORMAT),
            TABLE_HEADER,
            TABLE_SEPARATOR
        )
    }
}

/// `|ACME CORP|2024-01-02 10:00:00|[link](https://...)|`
/// A '|' in the link would end the cell early, so it is written as `%7C`.
pub fn render_row(filing: &Filing) -> String {
    format!(
        "|{}|{}|[link]({})|",
        filing.company,
        filing.timestamp,
        filing.url.replace('|', "%7C")
    )
}

/// Header followed by one row per filing; no newline after the last row.
pub fn render_document(header: &DocumentHeader, filings: &[Filing]) -> String {
    let rows: Vec<String> = filings.iter().map(render_row).collect();
    let mut content = header.render();
    content.push_str(&rows.join("\n"));
    content
}

/// Reads the filing rows back out of a stored document.
///
/// The table runs to the end of the document: every non-blank line after the
/// separator must be a filing row, so trailing notes are a `DocumentFormat`
/// error rather than being dropped on the next write.
pub fn parse_body(content: &str) -> Result<Vec<Filing>, StorageError> {
    let content = content.replace('\r', "");
    let lines: Vec<&str> = content.lines().collect();

    let body_start = lines
        .iter()
        .position(|line| line.trim() == TABLE_SEPARATOR)
        .map(|idx| idx + 1)
        .unwrap_or(HEADER_LINE_COUNT);

    lines
        .iter()
        .enumerate()
        .skip(body_start)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_row(line, idx + 1))
        .collect()
}

fn parse_row(line: &str, line_no: usize) -> Result<Filing, StorageError> {
    let malformed = |reason: &str| StorageError::DocumentFormat {
        line: line_no,
        reason: format!("{} in '{}'", reason, line),
    };

    let inner = line
        .trim()
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
        .ok_or_else(|| malformed("row is not wrapped in '|'"))?;

    // Split from the right: company names may themselves contain '|'.
    let mut cells = inner.rsplitn(3, '|');
    let (link, timestamp, company) = match (cells.next(), cells.next(), cells.next()) {
        (Some(link), Some(timestamp), Some(company)) => (link, timestamp, company),
        _ => return Err(malformed("expected three cells")),
    };

    let timestamp = timestamp
        .parse::<Timestamp>()
        .map_err(|e| malformed(&format!("bad timestamp ({})", e)))?;
    let url = link
        .trim()
        .strip_prefix("[link](")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| malformed("link cell is not [link](url)"))?;

    Ok(Filing::new(company, timestamp, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filing(company: &str, ts: &str, url: &str) -> Filing {
        Filing::new(company, ts.parse().unwrap(), url)
    }

    fn header() -> DocumentHeader {
        let checked_at = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        DocumentHeader::new("1.05", checked_at)
    }

    #[test]
    fn header_names_item_and_check_time() {
        assert_eq!(
            header().render(),
            "# List of Form 8-Ks with item 1.05\nLast checked 2024-01-03 12:30:00\n\n|Company|Timestamp|Link|\n|---|---|---|\n"
        );
    }

    #[test]
    fn renders_one_row_per_filing() {
        let filings = vec![
            filing("ACME CORP", "2024-01-03 09:00:00", "https://www.sec.gov/a-index.htm"),
            filing("BETA INC", "2024-01-02 10:00:00", "https://www.sec.gov/b-index.htm"),
        ];
        let doc = render_document(&header(), &filings);
        assert!(doc.ends_with(
            "|---|---|---|\n|ACME CORP|2024-01-03 09:00:00|[link](https://www.sec.gov/a-index.htm)|\n|BETA INC|2024-01-02 10:00:00|[link](https://www.sec.gov/b-index.htm)|"
        ));
    }

    #[test]
    fn empty_list_renders_header_only() {
        assert_eq!(render_document(&header(), &[]), header().render());
        assert!(parse_body(&header().render()).unwrap().is_empty());
    }

    #[test]
    fn rendered_document_parses_back() {
        let filings = vec![
            filing("ACME | SONS", "2024-01-03 09:00:00", "https://www.sec.gov/a-index.htm"),
            filing("BETA (DE) INC", "2024-01-02 10:00:00", "https://www.sec.gov/b-index.htm"),
        ];
        let parsed = parse_body(&render_document(&header(), &filings)).unwrap();
        assert_eq!(parsed, filings);
    }

    #[test]
    fn tolerates_crlf_and_trailing_newline() {
        let doc = render_document(
            &header(),
            &[filing("ACME", "2024-01-03 09:00:00", "https://www.sec.gov/a-index.htm")],
        )
        .replace('\n', "\r\n")
            + "\r\n";
        let parsed = parse_body(&doc).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].company, "ACME");
    }

    #[test]
    fn malformed_row_reports_line_number() {
        let doc = format!("{}|ACME|not a time|[link](x)|", header().render());
        match parse_body(&doc) {
            Err(StorageError::DocumentFormat { line, reason }) => {
                assert_eq!(line, 6);
                assert!(reason.contains("bad timestamp"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn pipe_in_link_is_escaped_and_reads_back() {
        let filings = vec![filing(
            "ACME",
            "2024-01-03 09:00:00",
            "https://www.sec.gov/a|b-index.htm",
        )];
        let doc = render_document(&header(), &filings);
        assert!(doc.ends_with("|ACME|2024-01-03 09:00:00|[link](https://www.sec.gov/a%7Cb-index.htm)|"));

        let parsed = parse_body(&doc).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].company, "ACME");
        assert_eq!(parsed[0].url, "https://www.sec.gov/a%7Cb-index.htm");
    }

    #[test]
    fn note_after_table_is_rejected() {
        let doc = format!(
            "{}|ACME|2024-01-03 09:00:00|[link](https://www.sec.gov/a-index.htm)|\n\nSource: SEC EDGAR",
            header().render()
        );
        match parse_body(&doc) {
            Err(StorageError::DocumentFormat { line, reason }) => {
                assert_eq!(line, 8);
                assert!(reason.contains("Source: SEC EDGAR"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
