//! Folder-name normalization
//!
//! Subject lines carry track numbers, part counts, and bracketed
//! annotations that defeat naive grouping. This pipeline strips them so
//! that postings like `"The Band - Live 1972 - 03 - Song (1/4)"` and
//! `"The Band - Live 1972 - 07 - Other (2/5)"` land in one folder.

/// Characters treated as filler when hunting for numeric runs
fn is_number_or_space(c: char) -> bool {
    c.is_ascii_whitespace() || c.is_ascii_digit() || c == '_' || c == '-' || c == '/'
}

/// Drop the first `n of m` / `n/m` expression along with the numeric run
/// around it
fn remove_of_expressions(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();

    let start = find_seq(&chars, &['o', 'f'])
        .or_else(|| find_seq(&chars, &['O', 'F']))
        .or_else(|| chars.iter().position(|&c| c == '/'));
    let Some(start) = start else {
        return s.to_string();
    };

    let mut found_number = false;

    let mut left = start;
    while left > 0 && is_number_or_space(chars[left - 1]) {
        found_number |= chars[left - 1].is_ascii_digit();
        left -= 1;
    }

    let mut right = (start + 2).min(chars.len());
    while right < chars.len() && is_number_or_space(chars[right]) {
        found_number |= chars[right].is_ascii_digit();
        right += 1;
    }

    if !found_number {
        return s.to_string();
    }

    let mut out: String = chars[..left].iter().collect();
    out.extend(&chars[right..]);
    out
}

fn find_seq(haystack: &[char], needle: &[char]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Drop a trailing token made of digits and filler (track numbers)
fn remove_number_at_end(s: &str) -> String {
    if let Some(pos) = s.rfind(' ') {
        let tail = &s[pos + 1..];
        if tail.chars().all(is_number_or_space) {
            return s[..pos].to_string();
        }
    }
    s.to_string()
}

/// Collapse all-numeric runs between dashes (`" - 03 - "` separators)
fn remove_numbers_between_dashes(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    let mut anchor = chars.iter().position(|&c| c == '-');

    while let Some(left) = anchor {
        let next_dash = chars[left + 1..]
            .iter()
            .position(|&c| c == '-')
            .map(|offset| offset + left + 1);

        match next_dash {
            Some(right) => {
                let numeric = chars[left..right].iter().copied().all(is_number_or_space);
                if numeric && right - left > 1 {
                    chars.drain(left..=right);
                    if left >= chars.len() {
                        break;
                    }
                    // keep the anchor: the spliced text may expose another run
                    anchor = Some(left);
                } else {
                    anchor = Some(right);
                }
            }
            None => {
                if chars[left..].iter().copied().all(is_number_or_space) {
                    chars.truncate(left);
                }
                break;
            }
        }
    }

    chars.into_iter().collect()
}

/// Normalize a folder-name candidate extracted from a subject line
///
/// Returns the cleaned name; the result can be empty when the subject was
/// nothing but numbering, in which case grouping falls back to a
/// placeholder title.
pub fn normalize_folder_name(folder_name: &str) -> String {
    let mut name = folder_name.trim().to_string();

    // a colon usually separates a reposter's prefix from the title
    if let Some(pos) = name.find(':') {
        name = name[pos + 1..].to_string();
    }

    // drop the last bracketed annotation
    if let Some(open) = name.rfind('[')
        && let Some(close) = name[open..].find(']').map(|o| o + open)
    {
        let mut stripped = name[..open].to_string();
        stripped.push_str(&name[close + 1..]);
        name = stripped;
    }

    name = remove_of_expressions(&name);
    name = remove_number_at_end(&name);
    name = remove_numbers_between_dashes(&name);

    name = name
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string();

    // bound the length, finishing the word in progress
    let chars: Vec<char> = name.chars().collect();
    if chars.len() > 30 {
        let mut end = 29;
        while end < chars.len() && chars[end].is_alphabetic() {
            end += 1;
        }
        name = chars[..end].iter().collect();
    }

    name
}
