use crate::types::StreamEntry;
use regex::Regex;

/// Name used when an `#EXTINF:` line carries no usable channel name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Leading marker expected on the first line of an M3U playlist.
pub const HEADER_MARKER: &str = "#EXTM3U";

/// Parse output: the ordered entries plus a flag for a missing `#EXTM3U`
/// header. The missing header is a warning for the caller, never an error.
#[derive(Debug, Clone, Default)]
pub struct ParsedPlaylist {
    pub entries: Vec<StreamEntry>,
    pub missing_header: bool,
}

/// Parse M3U playlist content into an ordered list of stream entries.
///
/// Supported shape per entry:
/// - one `#EXTINF:` metadata line, carrying the channel name either in a
///   `tvg-name="..."` attribute or after the first comma
/// - one following non-comment line holding the stream address
///
/// Blank lines and other `#` comment lines are skipped. An `#EXTINF:` line
/// with no following address line (end of input, or another `#EXTINF:`) is
/// dropped. This function never fails on malformed input; it extracts what
/// it can.
pub fn parse_playlist_str(content: &str) -> ParsedPlaylist {
    let name_re = Regex::new(r#"tvg-name="([^"]*)""#).expect("valid name pattern");

    let mut out = ParsedPlaylist::default();
    match content.lines().next() {
        Some(first) if first.trim_start().starts_with(HEADER_MARKER) => {}
        _ => out.missing_header = true,
    }

    let mut pending: Option<(String, String)> = None; // (name, raw header)
    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("#EXTINF:") {
            let name = match name_re.captures(line) {
                Some(caps) => caps[1].to_string(),
                // No attribute (or unterminated quote): take the text after
                // the first comma, or the fixed placeholder.
                None => rest
                    .split_once(',')
                    .map(|(_, after)| after.to_string())
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            };
            let name = name.trim_matches(|c| c == '"' || c == '\'').to_string();
            pending = Some((name, line.to_string()));
        } else if !line.starts_with('#') {
            if let Some((name, raw_header)) = pending.take() {
                out.entries.push(StreamEntry {
                    name,
                    raw_header,
                    address: line.to_string(),
                });
            }
        }
    }

    out
}

/// Serialize entries back into M3U form: the header marker, then each
/// entry's original metadata line followed by its address.
///
/// Feeding the output back through [`parse_playlist_str`] reproduces the
/// same entries, which is what makes the result fragments re-scannable.
pub fn fragment_str(entries: &[StreamEntry]) -> String {
    let mut s = String::from(HEADER_MARKER);
    s.push('\n');
    for e in entries {
        s.push_str(&e.raw_header);
        s.push('\n');
        s.push_str(&e.address);
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tvg_name_and_comma_fallback() {
        let input = "#EXTM3U\n#EXTINF:-1 tvg-name=\"Channel A\",Channel A\nhttp://example.com/a.m3u8\n#EXTINF:-1,Channel B\nhttp://example.com/b.m3u8\n";
        let parsed = parse_playlist_str(input);
        assert!(!parsed.missing_header);
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].name, "Channel A");
        assert_eq!(parsed.entries[0].address, "http://example.com/a.m3u8");
        assert_eq!(parsed.entries[1].name, "Channel B");
        assert_eq!(parsed.entries[1].address, "http://example.com/b.m3u8");
    }

    #[test]
    fn missing_header_is_flagged_not_fatal() {
        let input = "#EXTINF:-1,Solo\nhttp://example.com/solo\n";
        let parsed = parse_playlist_str(input);
        assert!(parsed.missing_header);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, "Solo");
    }

    #[test]
    fn orphan_extinf_at_eof_is_dropped() {
        let input = "#EXTM3U\n#EXTINF:-1,Channel C\n";
        let parsed = parse_playlist_str(input);
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn second_extinf_overwrites_pending() {
        let input = "#EXTM3U\n#EXTINF:-1,First\n#EXTINF:-1,Second\nhttp://example.com/s\n";
        let parsed = parse_playlist_str(input);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, "Second");
    }

    #[test]
    fn name_defaults_when_no_attribute_and_no_comma() {
        let input = "#EXTM3U\n#EXTINF:-1\nrtmp://host/app/stream\n";
        let parsed = parse_playlist_str(input);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, UNKNOWN_NAME);
    }

    #[test]
    fn quotes_trimmed_from_name() {
        let input = "#EXTM3U\n#EXTINF:-1,'Quoted'\nhttp://example.com/q\n";
        let parsed = parse_playlist_str(input);
        assert_eq!(parsed.entries[0].name, "Quoted");
    }

    #[test]
    fn unterminated_attribute_falls_back_to_comma() {
        let input = "#EXTM3U\n#EXTINF:-1 tvg-name=\"Broken,After Comma\nhttp://example.com/b\n";
        let parsed = parse_playlist_str(input);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, "After Comma");
    }

    #[test]
    fn comments_and_blank_lines_ignored() {
        let input = "#EXTM3U\n\n#EXTINF:-1,Kept\n# some comment\nhttp://example.com/kept\n#EXTGRP:news\n";
        let parsed = parse_playlist_str(input);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].address, "http://example.com/kept");
    }

    #[test]
    fn fragment_round_trips() {
        let input = "#EXTM3U\n#EXTINF:-1 tvg-name=\"Channel A\",Channel A\nhttp://example.com/a.m3u8\n#EXTINF:-1,Channel B\nhttp://example.com/b.m3u8\n";
        let first = parse_playlist_str(input);
        let second = parse_playlist_str(&fragment_str(&first.entries));
        assert!(!second.missing_header);
        assert_eq!(first.entries, second.entries);
    }
}
