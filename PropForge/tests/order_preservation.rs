mod common;

use common::PropBuilder;
use proptest::prelude::*;
use propforge::prelude::*;

fn decode(data: &[u8]) -> PropDocument {
    parse_prop_bytes(data, &CodecConfig::default()).unwrap()
}

proptest! {
    #[test]
    fn flat_values_keep_their_order(
        original in prop::collection::vec("[A-Za-z0-9]{1,12}", 1..20),
        seed in "[a-z]{0,30}",
    ) {
        let data = PropBuilder::flat(b"6VSM").strings(&original).build();
        let doc = decode(&data);
        prop_assert_eq!(doc.values(), original.iter().map(String::as_str).collect::<Vec<_>>());

        let edited: Vec<String> = original
            .iter()
            .enumerate()
            .map(|(i, v)| if i % 2 == 0 { format!("{seed}{v}{i}") } else { v.clone() })
            .collect();
        let (bytes, report) = serialize_prop(&doc, &edited).unwrap();
        prop_assert_eq!(report.entries, original.len());

        let again = decode(&bytes);
        prop_assert_eq!(again.values(), edited.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(again.preamble.block_size.declared as usize,
            bytes.len() - again.preamble.block_size.offset);
    }

    #[test]
    fn nested_values_keep_their_order(
        pairs in prop::collection::vec(("[A-Za-z]{1,8}", "[A-Za-z0-9.!?]{1,16}"), 1..8),
    ) {
        let borrowed: Vec<(&str, &str)> =
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let data = PropBuilder::nested(b"ERTM").pairs(&borrowed).build();
        let doc = decode(&data);

        let reversed: Vec<&str> = doc.values().into_iter().rev().collect();
        let (bytes, _) = serialize_prop(&doc, &reversed).unwrap();
        let redecoded = decode(&bytes);
        prop_assert_eq!(redecoded.values(), reversed);
    }
}
