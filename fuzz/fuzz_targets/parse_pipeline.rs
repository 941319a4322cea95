#![no_main]

use html_parse::{DomSnapshot, HtmlParse, ParserConfig};
use libfuzzer_sys::fuzz_target;

// First byte selects the configuration and chunk size; the rest is input.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, input)) = data.split_first() else {
        return;
    };
    let config = ParserConfig {
        coalesce_characters: true,
        buffer_events: selector & 1 != 0,
        optional_close: selector & 2 != 0,
    };
    let chunk = usize::from(selector >> 2).max(1);

    let mut whole = HtmlParse::new(config.clone());
    whole.parse_bytes(input).expect("parse");
    whole.finish_parse().expect("finish");
    whole
        .document()
        .dom()
        .check_invariants()
        .expect("tree invariants");

    let mut chunked = HtmlParse::new(config);
    for piece in input.chunks(chunk) {
        chunked.parse_bytes(piece).expect("parse");
    }
    chunked.finish_parse().expect("finish");

    assert_eq!(
        DomSnapshot::of_document(whole.document()).as_lines(),
        DomSnapshot::of_document(chunked.document()).as_lines(),
        "chunk size {chunk} changed the tree"
    );
});
