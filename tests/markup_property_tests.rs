use capyxliff::markup::{EditableSegment, Run, TagToken, decode, encode, tag_tokens};
use capyxliff::resolver::{CursorState, TagTransfer, copy_next_tag};
use capyxliff::{Side, TagRegistry};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn builtin_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[biu_^]{1,3}").expect("valid name regex")
}

fn numeric_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[0-9]{1,2}").expect("valid name regex")
}

fn tag_strategy() -> impl Strategy<Value = TagToken> {
    prop_oneof![
        builtin_name().prop_map(TagToken::start),
        builtin_name().prop_map(TagToken::end),
        numeric_name().prop_map(TagToken::start),
        numeric_name().prop_map(TagToken::end),
        numeric_name().prop_map(TagToken::empty),
        Just(TagToken::empty("j")),
    ]
}

fn literal_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ,.!?{}<>_^\n]{1,8}").expect("valid literal regex")
}

fn markup_strategy() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        literal_strategy(),
        tag_strategy().prop_map(|token| token.to_markup()),
    ];
    prop::collection::vec(piece, 0..12).prop_map(|pieces| pieces.concat())
}

fn counts(tokens: &[TagToken]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for token in tokens {
        *map.entry(token.to_markup()).or_insert(0) += 1;
    }
    map
}

proptest! {
    #[test]
    fn prop_round_trip_markup(text in markup_strategy()) {
        prop_assert_eq!(encode(&decode(&text)), text);
    }

    #[test]
    fn prop_round_trip_any_text_without_markers(text in "[^\r\u{2028}\u{2029}]*") {
        prop_assert_eq!(encode(&decode(&text)), text);
    }

    #[test]
    fn prop_decode_is_total(text in any::<String>()) {
        let expected: String = text
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .chars()
            .map(|c| if c == '\u{2028}' || c == '\u{2029}' { '\n' } else { c })
            .collect();
        prop_assert_eq!(encode(&decode(&text)), expected);
    }

    #[test]
    fn prop_decoded_literals_never_hold_tags(text in markup_strategy()) {
        for run in decode(&text) {
            if let Run::Literal(literal) = run {
                prop_assert!(tag_tokens(&literal).is_empty());
            }
        }
    }

    #[test]
    fn prop_editable_segment_preserves_markup(text in markup_strategy()) {
        let segment = EditableSegment::from_markup(&text);
        prop_assert_eq!(segment.to_markup(), text.clone());
        prop_assert_eq!(segment.to_markup_in_range(0, segment.len()), text);
    }

    #[test]
    fn prop_registry_ids_stay_unique(
        adds in prop::collection::vec(("[0-9]{1,2}", "[a-z<>/]{0,6}"), 0..20)
    ) {
        let mut registry = TagRegistry::new();
        let mut seen = HashSet::new();
        for (id, content) in &adds {
            let before = registry.tags(Side::Target).len();
            let added = registry.add_tag(id, content, Side::Target).is_some();
            prop_assert_eq!(added, seen.insert(id.clone()));
            if !added {
                prop_assert_eq!(registry.tags(Side::Target).len(), before);
            }
        }
        let ids: HashSet<&str> = registry.tags(Side::Target).iter().map(|t| t.id.as_str()).collect();
        prop_assert_eq!(ids.len(), registry.tags(Side::Target).len());
    }

    #[test]
    fn prop_copying_until_exhausted_covers_source(
        source in markup_strategy(),
        target in markup_strategy(),
    ) {
        let mut segment = EditableSegment::from_markup(&target);
        let mut registry = TagRegistry::new();
        let source_tokens = tag_tokens(&source);

        let mut steps = 0;
        loop {
            let cursor = CursorState::at(segment.len());
            match copy_next_tag(&source, &mut segment, &cursor, &mut registry) {
                TagTransfer::Applied(_) => steps += 1,
                TagTransfer::NothingMissing => break,
                TagTransfer::CannotWrap(_) => prop_assert!(false, "no selection was made"),
            }
            prop_assert!(steps <= source_tokens.len());
        }

        let have = counts(&segment.tags().cloned().collect::<Vec<_>>());
        for (token, needed) in counts(&source_tokens) {
            prop_assert!(have.get(&token).copied().unwrap_or(0) >= needed);
        }
        for tag in registry.tags(Side::Target) {
            prop_assert!(source_tokens.iter().any(|t| t.name == tag.id && !t.is_builtin()));
        }
    }
}
