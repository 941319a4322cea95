#![no_main]

use html_parse::{Event, HtmlParse, NodeId, TestingPeer};
use libfuzzer_sys::fuzz_target;

const NAMES: &[&str] = &["div", "p", "li", "td", "tr", "br", "span", "b"];

// Each byte is one synthetic event; the cursor is occasionally forced to an
// arbitrary node to exercise stack rebuilding.
fuzz_target!(|data: &[u8]| {
    let mut parser = HtmlParse::default();
    for &byte in data {
        let name = parser
            .document_mut()
            .intern_name(NAMES[usize::from(byte >> 5) % NAMES.len()]);
        let event = match byte & 0x7 {
            0 | 1 => Event::open_tag(name, Vec::new()),
            2 => Event::self_closing_tag(name, Vec::new()),
            3 | 4 => Event::close_tag(name),
            5 => Event::characters("t"),
            6 => Event::comment("c"),
            _ => {
                let len = parser.document().dom().len() as u32;
                let target = node_at(&parser, u32::from(byte >> 3) % len.max(1));
                let _ = TestingPeer::set_current(&mut parser, target);
                continue;
            }
        };
        TestingPeer::add_event(&mut parser, event);
    }
    parser.finish_parse().expect("finish");
    parser
        .document()
        .dom()
        .check_invariants()
        .expect("tree invariants");
});

fn node_at(parser: &HtmlParse, index: u32) -> NodeId {
    parser
        .document()
        .dom()
        .descendants(NodeId::ROOT)
        .nth(index as usize)
        .unwrap_or(NodeId::ROOT)
}
