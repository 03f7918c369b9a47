use m3u_scan_rs::playlist::{fragment_str, parse_playlist_str};

#[test]
fn parses_attribute_and_comma_named_channels_in_order() {
    let input = "#EXTM3U\n#EXTINF:-1 tvg-name=\"Channel A\",Channel A\nhttp://example.com/a.m3u8\n#EXTINF:-1,Channel B\nhttp://example.com/b.m3u8\n";
    let parsed = parse_playlist_str(input);
    assert!(!parsed.missing_header);
    let names: Vec<_> = parsed.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Channel A", "Channel B"]);
}

#[test]
fn extinf_without_address_yields_no_entries() {
    let parsed = parse_playlist_str("#EXTM3U\n#EXTINF:-1,Channel C\n");
    assert!(parsed.entries.is_empty());
}

#[test]
fn round_trip_is_idempotent() {
    let input = concat!(
        "#EXTM3U\n",
        "#EXTINF:-1 tvg-name=\"News HD\" tvg-logo=\"x.png\",News HD\n",
        "http://example.com/news.m3u8\n",
        "#EXTINF:-1,Movies\n",
        "rtmp://host/app/movies\n",
        "#EXTINF:-1,Movies\n",
        "rtmp://host/app/movies\n", // duplicate on purpose: no dedup
    );
    let first = parse_playlist_str(input);
    assert_eq!(first.entries.len(), 3);

    let serialized = fragment_str(&first.entries);
    let second = parse_playlist_str(&serialized);
    assert_eq!(first.entries, second.entries);

    // A second round changes nothing either.
    let third = parse_playlist_str(&fragment_str(&second.entries));
    assert_eq!(second.entries, third.entries);
}
