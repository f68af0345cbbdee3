//! XOVER header parsing
//!
//! One overview row describes one posted article. The subject line encodes
//! the interesting structure: a filename, usually a `(n/m)`-style part
//! count, and often a title prefix that becomes a folder-name candidate.

use crate::subject::normalize_folder_name;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// One parsed XOVER row
#[derive(Debug, Clone)]
pub struct ParsedHeader {
    /// Raw filename recovered from the subject
    pub filename: String,
    /// Normalized folder-name candidate, when the subject carried a title
    /// prefix before the filename
    pub folder_name: Option<String>,
    /// Message-id used to fetch the body later
    pub message_id: String,
    /// Declared article size in bytes
    pub size: u64,
    /// 1-based part number (0 appears in the wild and is discarded upstream)
    pub part_number: u32,
    /// Declared total number of parts
    pub total_parts: u32,
    /// Posting date, when the Date header was parseable
    pub mod_date: Option<DateTime<Utc>>,
}

/// Parse one tab-separated XOVER line
///
/// Field layout: `number subject from date message-id references bytes
/// lines [...]`. Returns `None` for rows that cannot carry a file — a
/// malformed posting must never abort the listing.
pub fn parse_header(line: &str) -> Option<ParsedHeader> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 7 {
        return None;
    }

    let subject = fields[1];
    let message_id = fields[4].to_string();
    let size = fields[6].trim().parse::<u64>().unwrap_or(0);
    let mod_date = parse_date(fields[3]);

    match find_part_count(subject) {
        Some(count) => {
            let before = &subject[..count.delim_start];
            let (filename, folder_name) = match before.rfind('-') {
                Some(dash) => (
                    before[dash + 1..].trim().to_string(),
                    Some(normalize_folder_name(&before[..dash])),
                ),
                // no title prefix: the whole base is the filename
                None => (before.trim().to_string(), None),
            };
            Some(ParsedHeader {
                filename,
                folder_name,
                message_id,
                size,
                part_number: count.part_number,
                total_parts: count.total_parts,
                mod_date,
            })
        }
        None => Some(ParsedHeader {
            filename: subject.trim().to_string(),
            folder_name: None,
            message_id,
            size,
            part_number: 1,
            total_parts: 1,
            mod_date,
        }),
    }
}

struct PartCount {
    /// Byte offset of the opening delimiter in the subject
    delim_start: usize,
    part_number: u32,
    total_parts: u32,
}

/// Find a `(n/m)`, `(n-m)`, or `(n of m)` pattern in the subject
///
/// Parentheses are scanned first; brackets only when the subject has no
/// parenthesis at all. Numbers parse atoi-style (leading digits, 0 when
/// absent), so `"(part one/two)"` still counts as a match with part 0.
fn find_part_count(subject: &str) -> Option<PartCount> {
    if subject.contains('(') {
        scan_delimited(subject, '(', ')')
    } else {
        scan_delimited(subject, '[', ']')
    }
}

fn scan_delimited(subject: &str, open: char, close: char) -> Option<PartCount> {
    let mut search_from = 0;
    while let Some(rel) = subject[search_from..].find(open) {
        let l = search_from + rel;
        let Some(r) = subject[l + 1..].find(close).map(|o| o + l + 1) else {
            return None;
        };
        let inner = &subject[l + 1..r];

        let separator = inner
            .find('/')
            .map(|i| (i, 1))
            .or_else(|| inner.find('-').map(|i| (i, 1)))
            .or_else(|| inner.find(" of ").map(|i| (i, 4)));

        if let Some((sep, width)) = separator {
            return Some(PartCount {
                delim_start: l,
                part_number: leading_number(&inner[..sep]),
                total_parts: leading_number(&inner[sep + width..]),
            });
        }
        search_from = r + 1;
    }
    None
}

/// atoi-style parse: skip leading whitespace, read the digit run, 0 if none
fn leading_number(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Permissive parse of the overview Date field
///
/// RFC 2822 first; after that, commas are stripped and a handful of
/// `day month year [time]` layouts are tried. `None` means the date was
/// hopeless, not that the row is bad.
pub fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(date) {
        return Some(parsed.with_timezone(&Utc));
    }

    let cleaned: String = date.replace(',', "");
    let cleaned = cleaned.trim();

    const ZONED: &[&str] = &["%a %d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M:%S %z"];
    for format in ZONED {
        if let Ok(parsed) = DateTime::parse_from_str(cleaned, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    const NAIVE: &[&str] = &[
        "%a %d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M",
    ];
    for format in NAIVE {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }

    const DATE_ONLY: &[&str] = &["%a %d %b %Y", "%d %b %Y"];
    for format in DATE_ONLY {
        if let Ok(parsed) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(Utc.from_utc_datetime(&parsed.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xover_line(subject: &str) -> String {
        format!(
            "1001\t{}\tposter@example.com\tMon, 01 Jan 2024 10:30:00 +0000\t<frag@example>\t\t34567\t120",
            subject
        )
    }

    #[test]
    fn test_simple_multipart_subject() {
        let header = parse_header(&xover_line("My Song (1/2)")).unwrap();
        assert_eq!(header.filename, "My Song");
        assert_eq!(header.folder_name, None);
        assert_eq!(header.part_number, 1);
        assert_eq!(header.total_parts, 2);
        assert_eq!(header.message_id, "<frag@example>");
        assert_eq!(header.size, 34567);
        assert!(header.mod_date.is_some());
    }

    #[test]
    fn test_subject_with_title_prefix() {
        let header =
            parse_header(&xover_line("The Band - Live 1972 - 03 - Song Title (1/4)")).unwrap();
        assert_eq!(header.filename, "Song Title");
        assert_eq!(header.folder_name.as_deref(), Some("The Band - Live 1972"));
        assert_eq!(header.part_number, 1);
        assert_eq!(header.total_parts, 4);
    }

    #[test]
    fn test_bracketed_part_count() {
        let header = parse_header(&xover_line("Title - track.mp3 [2/5]")).unwrap();
        assert_eq!(header.filename, "track.mp3");
        assert_eq!(header.part_number, 2);
        assert_eq!(header.total_parts, 5);
    }

    #[test]
    fn test_dash_separator_in_count() {
        let header = parse_header(&xover_line("file.bin (2-4)")).unwrap();
        assert_eq!(header.part_number, 2);
        assert_eq!(header.total_parts, 4);
    }

    #[test]
    fn test_of_separator_in_count() {
        let header = parse_header(&xover_line("file.bin (3 of 7)")).unwrap();
        assert_eq!(header.part_number, 3);
        assert_eq!(header.total_parts, 7);
    }

    #[test]
    fn test_non_multipart_subject() {
        let header = parse_header(&xover_line("just a discussion post")).unwrap();
        assert_eq!(header.filename, "just a discussion post");
        assert_eq!(header.folder_name, None);
        assert_eq!(header.part_number, 1);
        assert_eq!(header.total_parts, 1);
    }

    #[test]
    fn test_parenthesized_aside_without_count() {
        // a paren pair with no separator inside is not a part count
        let header = parse_header(&xover_line("hello (world)")).unwrap();
        assert_eq!(header.filename, "hello (world)");
        assert_eq!(header.total_parts, 1);
    }

    #[test]
    fn test_second_paren_pair_carries_count() {
        let header = parse_header(&xover_line("demo (final) - clip.avi (2/3)")).unwrap();
        assert_eq!(header.filename, "clip.avi");
        assert_eq!(header.part_number, 2);
        assert_eq!(header.total_parts, 3);
    }

    #[test]
    fn test_non_numeric_count_yields_part_zero() {
        let header = parse_header(&xover_line("demo (part one/two)")).unwrap();
        assert_eq!(header.part_number, 0);
        assert_eq!(header.total_parts, 0);
    }

    #[test]
    fn test_short_line_rejected() {
        assert!(parse_header("1001\tsubject only\tposter").is_none());
        assert!(parse_header("").is_none());
    }

    #[test]
    fn test_unparseable_size_defaults_to_zero() {
        let line =
            "1001\tfile (1/1)\tposter\tMon, 01 Jan 2024 10:30:00 +0000\t<m@x>\t\tnot-a-number\t9";
        let header = parse_header(line).unwrap();
        assert_eq!(header.size, 0);
    }

    #[test]
    fn test_parse_date_rfc2822() {
        let parsed = parse_date("Mon, 01 Jan 2024 10:30:00 +0000").unwrap();
        assert_eq!(parsed.timestamp(), 1_704_105_000);
    }

    #[test]
    fn test_parse_date_gmt_suffix() {
        assert!(parse_date("Mon, 01 Jan 2024 10:30:00 GMT").is_some());
    }

    #[test]
    fn test_parse_date_without_weekday() {
        assert!(parse_date("01 Jan 2024 10:30:00 +0000").is_some());
    }

    #[test]
    fn test_parse_date_naive() {
        assert!(parse_date("Mon 01 Jan 2024 10:30:00").is_some());
        assert!(parse_date("01 Jan 2024").is_some());
    }

    #[test]
    fn test_parse_date_garbage() {
        assert!(parse_date("yesterday-ish").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_date_ordering_preserved() {
        let older = parse_date("Mon, 01 Jan 2024 10:00:00 +0000").unwrap();
        let newer = parse_date("Tue, 02 Jan 2024 10:00:00 +0000").unwrap();
        assert!(newer > older);
    }
}
