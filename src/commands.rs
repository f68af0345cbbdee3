//! NNTP command builders and response-line parsers

use crate::error::{NntpfsError, Result};
use crate::response::NntpResponse;

/// Build AUTHINFO USER command
pub fn authinfo_user(username: &str) -> String {
    format!("AUTHINFO USER {}\r\n", username)
}

/// Build AUTHINFO PASS command
pub fn authinfo_pass(password: &str) -> String {
    format!("AUTHINFO PASS {}\r\n", password)
}

/// Build GROUP command
pub fn group(newsgroup: &str) -> String {
    format!("GROUP {}\r\n", newsgroup)
}

/// Build XOVER command for a closed article-number range
pub fn xover(first: u64, last: u64) -> String {
    format!("XOVER {}-{}\r\n", first, last)
}

/// Build BODY command for a message-id
pub fn body(message_id: &str) -> String {
    format!("BODY {}\r\n", message_id)
}

/// Build MODE READER command (RFC 3977 §5.3)
///
/// Doubles as the pool's liveness probe: a stale connection fails the
/// round-trip, a live one answers with some 2xx.
pub fn mode_reader() -> &'static str {
    "MODE READER\r\n"
}

/// Build QUIT command
pub fn quit() -> &'static str {
    "QUIT\r\n"
}

/// Parse an NNTP response line into code and message
pub fn parse_response_line(line: &str) -> Result<(u16, String)> {
    // Strip UTF-8 BOM if present (some broken servers/proxies add it)
    let line = line.trim_start_matches('\u{FEFF}');

    let bytes = line.as_bytes();
    if bytes.len() < 3
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[2].is_ascii_digit()
    {
        return Err(NntpfsError::InvalidResponse(
            line.chars().take(100).collect(),
        ));
    }

    // A fourth digit means a malformed code like "99999", not "999" + message
    if bytes.len() > 3 && bytes[3].is_ascii_digit() {
        return Err(NntpfsError::InvalidResponse(
            line.chars().take(100).collect(),
        ));
    }

    let code = line[0..3]
        .parse::<u16>()
        .map_err(|_| NntpfsError::InvalidResponse(line.chars().take(100).collect()))?;

    let message = if line.len() > 3 {
        if bytes[3] == b' ' {
            line[4..].to_string()
        } else {
            // Missing space case: "200message"
            line[3..].to_string()
        }
    } else {
        String::new()
    };

    Ok((code, message))
}

/// Parse a single-line NNTP response
pub fn parse_single_response(line: &str) -> Result<NntpResponse> {
    let (code, message) = parse_response_line(line)?;
    Ok(NntpResponse { code, message })
}

/// Group information returned by the GROUP command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupInfo {
    /// Number of articles in the group
    pub count: u64,
    /// Number of the first article
    pub first: u64,
    /// Number of the last article
    pub last: u64,
}

/// Parse a GROUP response message: "total first last group-name"
pub fn parse_group_response(response: &NntpResponse) -> Result<GroupInfo> {
    let parts: Vec<&str> = response.message.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(NntpfsError::InvalidResponse(response.message.clone()));
    }

    let count = parts[0]
        .parse()
        .map_err(|_| NntpfsError::InvalidResponse(response.message.clone()))?;
    let first = parts[1]
        .parse()
        .map_err(|_| NntpfsError::InvalidResponse(response.message.clone()))?;
    let last = parts[2]
        .parse()
        .map_err(|_| NntpfsError::InvalidResponse(response.message.clone()))?;

    Ok(GroupInfo { count, first, last })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builders() {
        assert_eq!(authinfo_user("testuser"), "AUTHINFO USER testuser\r\n");
        assert_eq!(authinfo_pass("testpass"), "AUTHINFO PASS testpass\r\n");
        assert_eq!(group("alt.binaries.test"), "GROUP alt.binaries.test\r\n");
        assert_eq!(xover(1000, 1499), "XOVER 1000-1499\r\n");
        assert_eq!(body("<123@example>"), "BODY <123@example>\r\n");
        assert_eq!(mode_reader(), "MODE READER\r\n");
        assert_eq!(quit(), "QUIT\r\n");
    }

    #[test]
    fn test_parse_response_line() {
        let (code, msg) = parse_response_line("200 server ready").unwrap();
        assert_eq!(code, 200);
        assert_eq!(msg, "server ready");

        let (code, msg) = parse_response_line("281 Authentication accepted").unwrap();
        assert_eq!(code, 281);
        assert_eq!(msg, "Authentication accepted");
    }

    #[test]
    fn test_parse_response_line_invalid() {
        assert!(parse_response_line("abc").is_err());
        assert!(parse_response_line("").is_err());
        assert!(parse_response_line("12").is_err());
    }

    #[test]
    fn test_parse_response_line_code_overflow() {
        assert!(parse_response_line("99999 message").is_err());
        assert!(parse_response_line("2000 message").is_err());

        let (code, msg) = parse_response_line("999 message").unwrap();
        assert_eq!(code, 999);
        assert_eq!(msg, "message");
    }

    #[test]
    fn test_parse_response_line_bom() {
        let (code, msg) = parse_response_line("\u{FEFF}200 server ready").unwrap();
        assert_eq!(code, 200);
        assert_eq!(msg, "server ready");
    }

    #[test]
    fn test_parse_response_line_missing_space() {
        let (code, msg) = parse_response_line("200message").unwrap();
        assert_eq!(code, 200);
        assert_eq!(msg, "message");

        let (code, msg) = parse_response_line("200").unwrap();
        assert_eq!(code, 200);
        assert_eq!(msg, "");
    }

    #[test]
    fn test_parse_group_response() {
        let response = NntpResponse {
            code: 211,
            message: "500 1000 1499 rec.test".to_string(),
        };

        let info = parse_group_response(&response).unwrap();
        assert_eq!(info.count, 500);
        assert_eq!(info.first, 1000);
        assert_eq!(info.last, 1499);
    }

    #[test]
    fn test_parse_group_response_short() {
        let response = NntpResponse {
            code: 211,
            message: "3000 1".to_string(),
        };
        assert!(parse_group_response(&response).is_err());
    }
}
