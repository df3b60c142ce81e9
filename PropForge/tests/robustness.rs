mod common;

use common::PropBuilder;
use propforge::prelude::*;

fn parse(data: &[u8]) -> Result<PropDocument> {
    parse_prop_bytes(data, &CodecConfig::default())
}

#[test]
fn test_overlong_length_is_corrupt() {
    let mut data = PropBuilder::flat(b"6VSM").strings(&["Hello"]).build();
    let offset = parse(&data).unwrap().entries[0].offset.unwrap();
    data[offset..offset + 4].copy_from_slice(&1000i32.to_le_bytes());

    match parse(&data) {
        Err(Error::CorruptLength {
            offset: at,
            length,
            remaining,
        }) => {
            assert_eq!(at, offset);
            assert_eq!(length, 1000);
            assert_eq!(remaining, 5);
        }
        other => panic!("expected CorruptLength, got {other:?}"),
    }
}

#[test]
fn test_negative_length_is_corrupt() {
    let mut data = PropBuilder::nested(b"NIBM").pairs(&[("a", "b")]).build();
    let offset = parse(&data).unwrap().entries[1].offset.unwrap();
    data[offset..offset + 4].copy_from_slice(&(-1i32).to_le_bytes());
    assert!(matches!(
        parse(&data),
        Err(Error::CorruptLength { length: -1, .. })
    ));
}

#[test]
fn test_every_truncation_fails_cleanly() {
    for tag in common::TAGS {
        let data = PropBuilder::nested(tag)
            .pairs(&[("English", "Hello"), ("German", "Hallo")])
            .build();
        for cut in 0..data.len() {
            assert!(parse(&data[..cut]).is_err(), "{tag:?} cut at {cut} parsed");
            // The diagnostic pass never fails
            let tree = inspect_prop_bytes(&data[..cut], &CodecConfig::default());
            assert!(tree.has_error(), "{tag:?} cut at {cut} has no error node");
        }
    }
}

#[test]
fn test_short_input_is_truncated_header() {
    assert!(matches!(parse(b"6VS"), Err(Error::TruncatedHeader)));
}

#[test]
fn test_unknown_tag_uses_legacy_rules() {
    let data = PropBuilder::flat(b"ABCD").strings(&["caf\u{e9}"]).build();
    let doc = parse(&data).unwrap();
    assert_eq!(doc.header(), HeaderTag::Other(*b"ABCD"));
    assert_eq!(doc.encoding(), TextEncoding::Legacy(CodePage(1252)));
    // UTF-8 bytes read through windows-1252
    assert_eq!(doc.value(1), Some("cafÃ©"));
}

#[test]
fn test_small_nested_structure_falls_through_to_flat() {
    // 26 bytes from the block count field: below the plausibility threshold
    let data = PropBuilder::nested(b"6VSM")
        .unknown_marker()
        .pairs(&[("a", "b")])
        .build();
    let doc = parse(&data).unwrap();
    assert_eq!(doc.layout, BlockLayout::Fallback(FallbackStrategy::FlatUnverified));
    assert!(!doc.is_editable());
}

#[test]
fn test_large_nested_structure_is_accepted() {
    let data = PropBuilder::nested(b"6VSM")
        .unknown_marker()
        .pairs(&[("Name", "Clementine"), ("English", "Hello there")])
        .build();
    let doc = parse(&data).unwrap();
    assert_eq!(doc.layout, BlockLayout::Fallback(FallbackStrategy::Nested));
    assert_eq!(doc.values(), ["Name", "Clementine", "English", "Hello there"]);
}
