//! Parsing of capture descriptors from an index listing.
//!
//! An input list is free-form text split into entries by the literal `--`
//! token. Each entry must carry two things somewhere in its text:
//!
//! - `Original: <url>`: the URL that was originally crawled
//! - `<https-url>#offset=<digits>&length=<digits>`: the archive file holding
//!   the capture and the byte coordinates of its record
//!
//! Index listings commonly join the two parts with ` -- ` as well, so a chunk
//! that names an original URL but no archive location absorbs the chunk that
//! follows it (as long as that chunk does not start a new `Original:`).
//!
//! Entries lacking either part are dropped without an error. Callers can
//! therefore distinguish "no descriptor" (`None`) from a failure later in
//! the pipeline.

use std::fmt;

/// Separator between entries in an input list.
pub const ENTRY_SEPARATOR: &str = "--";

const ORIGINAL_LABEL: &str = "Original: ";
const OFFSET_MARKER: &str = "#offset=";
const LENGTH_MARKER: &str = "&length=";

/// One unit of work: where a capture lives and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub original_url: String,
    pub archive_url: String,
    pub offset: u64,
    pub length: u64,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}#offset={}&length={})",
            self.original_url, self.archive_url, self.offset, self.length
        )
    }
}

/// Split an input list into descriptors, keeping input order.
///
/// Malformed entries are skipped silently.
pub fn parse_list(text: &str) -> Vec<Descriptor> {
    split_entries(text)
        .iter()
        .filter_map(|entry| parse_entry(entry))
        .collect()
}

/// Split an input list into entries on [`ENTRY_SEPARATOR`].
///
/// A chunk carrying an `Original:` label without an archive location is
/// joined with the next chunk unless that chunk has a label of its own.
pub fn split_entries(text: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    let mut open = false;

    for chunk in text.trim().split(ENTRY_SEPARATOR) {
        let labelled = find_original_url(chunk).is_some();
        match entries.last_mut() {
            Some(pending) if open && !labelled => {
                pending.push_str(ENTRY_SEPARATOR);
                pending.push_str(chunk);
            }
            _ => entries.push(chunk.to_string()),
        }

        let current = entries.last().map(String::as_str).unwrap_or_default();
        open = find_original_url(current).is_some() && find_archive_location(current).is_none();
    }

    entries
}

/// Parse one entry of an input list.
///
/// # Returns
///
/// `Some(descriptor)` when both the `Original:` URL and the archive location
/// are present, `None` otherwise.
pub fn parse_entry(entry: &str) -> Option<Descriptor> {
    let original_url = find_original_url(entry)?;
    let (archive_url, offset, length) = find_archive_location(entry)?;

    Some(Descriptor {
        original_url: original_url.to_string(),
        archive_url: archive_url.to_string(),
        offset,
        length,
    })
}

/// First `Original: http...` occurrence, up to the next whitespace.
fn find_original_url(entry: &str) -> Option<&str> {
    entry.match_indices(ORIGINAL_LABEL).find_map(|(pos, _)| {
        let rest = &entry[pos + ORIGINAL_LABEL.len()..];
        let url = take_token(rest);
        // "http" plus at least one more character
        (url.starts_with("http") && url.len() > "http".len()).then_some(url)
    })
}

/// Leftmost `https...#offset=N&length=M` occurrence.
///
/// The URL part is as long as possible: when a token carries several
/// `#offset=` fragments, the last valid one supplies the coordinates.
fn find_archive_location(entry: &str) -> Option<(&str, u64, u64)> {
    entry.match_indices("https").find_map(|(start, _)| {
        let token = take_token(&entry[start..]);
        let min_url_len = "https".len() + 1;

        token
            .rmatch_indices(OFFSET_MARKER)
            .filter(|(pos, _)| *pos >= min_url_len)
            .find_map(|(pos, _)| {
                let (offset, length) = parse_coordinates(&token[pos + OFFSET_MARKER.len()..])?;
                Some((&token[..pos], offset, length))
            })
    })
}

/// Parse `N&length=M` from the start of `fragment`. Trailing text after the
/// length digits is ignored.
fn parse_coordinates(fragment: &str) -> Option<(u64, u64)> {
    let (offset_digits, rest) = split_digits(fragment);
    let rest = rest.strip_prefix(LENGTH_MARKER)?;
    let (length_digits, _) = split_digits(rest);

    if offset_digits.is_empty() || length_digits.is_empty() {
        return None;
    }

    Some((offset_digits.parse().ok()?, length_digits.parse().ok()?))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn take_token(s: &str) -> &str {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    &s[..end]
}
