use html_parse::{
    DomSnapshot, HtmlParse, NodeKind, ParseState, ParserConfig, SymbolTable, render_html,
};
use html_test_support::assert_lines_eq;
use html_test_support::chunking::Lcg;

const TAGS: &[&str] = &["div", "p", "span", "li", "td", "tr", "b", "br", "img", "script"];

/// Random tag soup: unbalanced, misnested and stray close tags included.
fn tag_soup(seed: u64, tokens: usize) -> String {
    let mut rng = Lcg::new(seed);
    let mut out = String::new();
    for _ in 0..tokens {
        let tag = TAGS[rng.gen_range(TAGS.len())];
        match rng.gen_range(6) {
            0 | 1 => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
            }
            2 => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            3 => out.push_str("text "),
            4 => out.push_str("<!--c-->"),
            _ => {
                out.push('<');
                out.push_str(tag);
                out.push_str(" a=1/>");
            }
        }
    }
    out
}

fn parse_whole(input: &str, config: ParserConfig) -> HtmlParse {
    let mut parser = HtmlParse::new(config);
    parser.parse_text(input).expect("parse");
    parser.finish_parse().expect("finish");
    parser
}

fn lines(parser: &HtmlParse) -> Vec<String> {
    DomSnapshot::of_document(parser.document()).as_lines().to_vec()
}

#[test]
fn any_event_sequence_yields_a_valid_tree() {
    for seed in 0..64 {
        let input = tag_soup(seed, 80);
        let parser = parse_whole(&input, ParserConfig::default());
        assert_eq!(parser.state(), ParseState::Finished);
        parser
            .document()
            .dom()
            .check_invariants()
            .unwrap_or_else(|err| panic!("seed {seed}: {err}\ninput: {input}"));
    }
}

#[test]
fn chunk_boundaries_do_not_change_the_tree() {
    for seed in 0..16 {
        let input = tag_soup(seed, 40);
        let whole = lines(&parse_whole(&input, ParserConfig::default()));
        let mut rng = Lcg::new(seed ^ 0x5EED);
        let mut parser = HtmlParse::default();
        let mut rest = input.as_str();
        while !rest.is_empty() {
            let take = 1 + rng.gen_range(rest.len().min(7));
            let (chunk, tail) = rest.split_at(take);
            parser.parse_text(chunk).expect("parse");
            rest = tail;
        }
        parser.finish_parse().expect("finish");
        assert_lines_eq(&format!("seed {seed}: {input}"), &whole, &lines(&parser));
    }
}

#[test]
fn buffering_is_transparent() {
    for seed in 0..16 {
        let input = tag_soup(seed, 40);
        let direct = parse_whole(&input, ParserConfig::default());
        let buffered = parse_whole(
            &input,
            ParserConfig {
                buffer_events: true,
                ..ParserConfig::default()
            },
        );
        assert_lines_eq(&format!("seed {seed}"), &lines(&direct), &lines(&buffered));
        assert_eq!(direct.diagnostics(), buffered.diagnostics());
    }
}

#[test]
fn manual_flush_of_the_buffer_preserves_order() {
    let mut parser = HtmlParse::default();
    parser.set_buffer_events(true);
    parser.parse_text("<div><p>one").expect("parse");
    parser.flush().expect("flush");
    assert_eq!(parser.flush_buffer(), 3);
    parser.parse_text("<p>two</div>").expect("parse");
    assert_eq!(parser.buffered_len(), 3);
    parser.finish_parse().expect("finish");
    assert_eq!(
        lines(&parser),
        vec![
            "#document",
            "  <div>",
            "    <p>",
            "      \"one\"",
            "    <p>",
            "      \"two\"",
        ]
    );
}

#[test]
fn coalescing_is_idempotent() {
    let config = ParserConfig {
        coalesce_characters: false,
        ..ParserConfig::default()
    };
    let mut parser = HtmlParse::new(config);
    for chunk in ["<p>a", "b", "c<!--x-->d", "e</p>"] {
        parser.parse_text(chunk).expect("parse");
        parser.flush().expect("flush");
    }
    parser.finish_parse().expect("finish");

    let doc = parser.document_mut();
    let root = doc.dom().root();
    let p = doc.dom().children(root)[0];
    assert_eq!(doc.dom().children(p).len(), 6);

    assert_eq!(doc.dom_mut().coalesce_adjacent_text(p), Ok(3));
    let after_first = DomSnapshot::of_document(doc).as_lines().to_vec();
    assert_eq!(doc.dom_mut().coalesce_adjacent_text(p), Ok(0));
    assert_eq!(DomSnapshot::of_document(doc).as_lines(), after_first.as_slice());

    let kinds: Vec<NodeKind> = doc
        .dom()
        .children(p)
        .iter()
        .filter_map(|&child| doc.dom().kind(child))
        .collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Characters, NodeKind::Comment, NodeKind::Characters]
    );
    assert_eq!(doc.text_content(p), "abcde");
    doc.dom().check_invariants().expect("invariants");
}

#[test]
fn symbols_are_canonical() {
    let mut table = SymbolTable::new();
    let a = table.intern("href");
    let b = table.intern("href");
    let c = table.intern_name("HREF");
    let d = table.intern("HREF");
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_ne!(a, d);
    assert_eq!(table.len(), 2);
    assert_eq!(table.resolve(d), Some("HREF"));
    assert_eq!(table.lookup("src"), None);
    assert_eq!(table.len(), 2);
}

#[test]
fn parsed_names_share_one_symbol_per_spelling() {
    let parser = parse_whole(
        "<DIV Class=a><div CLASS=b><Div class=c></div></DIV></div>",
        ParserConfig::default(),
    );
    let doc = parser.document();
    assert_eq!(doc.symbols().len(), 2);
    let outer = doc.dom().children(doc.dom().root())[0];
    assert_eq!(doc.element_name(outer), Some("div"));
    assert_eq!(doc.attribute_value(outer, "class"), Some("a"));
}

#[test]
fn render_html_round_trips_well_formed_markup() {
    let input = "<html><body><div class=\"a\" id='b' hidden>x<br/>y<img src=z></div>\n<!--c--></body></html>";
    let parser = parse_whole(input, ParserConfig::default());
    assert_eq!(render_html(parser.document()), input);
}
