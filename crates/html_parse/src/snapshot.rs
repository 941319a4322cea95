//! Deterministic tree rendering for tests and debugging.
//!
//! Two renderings are provided:
//! - [`DomSnapshot`]: one indented line per node, with escaped text, for
//!   golden comparisons;
//! - [`render_html`]: markup reconstructed from the tree, honoring each
//!   element's recorded close style.
//!
//! Neither is a stable interchange format.

use crate::document::Document;
use crate::dom::{CloseStyle, NodeData, NodeId};
use std::fmt::{self, Write};

#[derive(Clone, Copy, Debug, Default)]
pub struct DomSnapshotOptions {
    /// Append `[style]` with each element's close style.
    pub close_styles: bool,
    /// Append `@line` with each node's source line.
    pub lines: bool,
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    /// Snapshot the subtree rooted at `root`.
    pub fn new(doc: &Document, root: NodeId, options: DomSnapshotOptions) -> Self {
        const INDENT_STEP: usize = 2;
        let dom = doc.dom();
        let mut lines = Vec::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = dom.node(id) else {
                continue;
            };
            let mut line = " ".repeat(depth * INDENT_STEP);
            write_node_line(&mut line, doc, node.data());
            if options.close_styles {
                if let Some(element) = node.as_element() {
                    let _ = write!(line, " [{}]", close_style_label(element.close_style));
                }
            }
            if options.lines {
                let _ = write!(line, " @{}", node.line());
            }
            lines.push(line);
            for &child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        Self { lines }
    }

    /// Snapshot the whole document.
    pub fn of_document(doc: &Document) -> Self {
        Self::new(doc, doc.dom().root(), DomSnapshotOptions::default())
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn close_style_label(style: CloseStyle) -> &'static str {
    match style {
        CloseStyle::Unclosed => "unclosed",
        CloseStyle::Explicit => "explicit",
        CloseStyle::Brief => "brief",
        CloseStyle::Void => "void",
        CloseStyle::Implicit => "implicit",
        CloseStyle::AutoClose => "auto",
    }
}

fn write_node_line(out: &mut String, doc: &Document, data: &NodeData) {
    let symbols = doc.symbols();
    match data {
        NodeData::Document => out.push_str("#document"),
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(symbols.resolve(element.name).unwrap_or("?"));
            for attr in &element.attributes {
                out.push(' ');
                out.push_str(symbols.resolve(attr.name).unwrap_or("?"));
                if let Some(value) = &attr.value {
                    out.push_str("=\"");
                    write_escaped(out, value);
                    out.push('"');
                }
            }
            out.push('>');
        }
        NodeData::Characters(text) => {
            out.push('"');
            write_escaped(out, text);
            out.push('"');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            write_escaped(out, text);
            out.push_str("-->");
        }
        NodeData::Directive(text) => {
            out.push_str("<!");
            write_escaped(out, text);
            out.push('>');
        }
        NodeData::Cdata(text) => {
            out.push_str("<![CDATA[");
            write_escaped(out, text);
            out.push_str("]]>");
        }
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii_control() => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
}

/// Reconstruct markup for the whole document.
///
/// Text and attribute values are written as stored (no entity encoding), and
/// attribute quoting follows the recorded quote style. End tags are written
/// only for elements closed explicitly in the source; implicitly closed and
/// auto-closed elements get none, matching the input they came from.
pub fn render_html(doc: &Document) -> String {
    enum Step {
        Open(NodeId),
        Close(NodeId),
    }

    let dom = doc.dom();
    let symbols = doc.symbols();
    let mut out = String::new();
    let mut stack: Vec<Step> = dom
        .children(dom.root())
        .iter()
        .rev()
        .map(|&child| Step::Open(child))
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => {
                let Some(node) = dom.node(id) else {
                    continue;
                };
                match node.data() {
                    NodeData::Document => {}
                    NodeData::Element(element) => {
                        out.push('<');
                        out.push_str(symbols.resolve(element.name).unwrap_or_default());
                        for attr in &element.attributes {
                            out.push(' ');
                            out.push_str(symbols.resolve(attr.name).unwrap_or_default());
                            if let Some(value) = &attr.value {
                                out.push('=');
                                let quote = match attr.quote {
                                    crate::dom::QuoteStyle::None => "",
                                    crate::dom::QuoteStyle::Single => "'",
                                    crate::dom::QuoteStyle::Double => "\"",
                                };
                                out.push_str(quote);
                                out.push_str(value);
                                out.push_str(quote);
                            }
                        }
                        if element.close_style == CloseStyle::Brief {
                            out.push_str("/>");
                            continue;
                        }
                        out.push('>');
                        stack.push(Step::Close(id));
                        for &child in node.children().iter().rev() {
                            stack.push(Step::Open(child));
                        }
                    }
                    NodeData::Characters(text) => out.push_str(text),
                    NodeData::Comment(text) => {
                        out.push_str("<!--");
                        out.push_str(text);
                        out.push_str("-->");
                    }
                    NodeData::Directive(text) => {
                        out.push_str("<!");
                        out.push_str(text);
                        out.push('>');
                    }
                    NodeData::Cdata(text) => {
                        out.push_str("<![CDATA[");
                        out.push_str(text);
                        out.push_str("]]>");
                    }
                }
            }
            Step::Close(id) => {
                let Some(element) = dom.element(id) else {
                    continue;
                };
                if element.close_style == CloseStyle::Explicit {
                    out.push_str("</");
                    out.push_str(symbols.resolve(element.name).unwrap_or_default());
                    out.push('>');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{DomSnapshot, DomSnapshotOptions, render_html};
    use crate::dom::CloseStyle;
    use crate::parse::HtmlParse;

    fn parse(input: &str) -> HtmlParse {
        let mut parser = HtmlParse::default();
        parser.parse_text(input).expect("parse");
        parser.finish_parse().expect("finish");
        parser
    }

    #[test]
    fn snapshot_lines_are_indented_and_escaped() {
        let parser = parse("<div class=\"a b\">line\n\"q\"<!--c--><br></div>");
        let snapshot = DomSnapshot::of_document(parser.document());
        assert_eq!(
            snapshot.as_lines(),
            &[
                "#document",
                "  <div class=\"a b\">",
                "    \"line\\n\\\"q\\\"\"",
                "    <!--c-->",
                "    <br>",
            ]
        );
        assert_eq!(snapshot.to_string(), snapshot.render());
    }

    #[test]
    fn snapshot_options_add_close_styles_and_lines() {
        let parser = parse("<ul>\n<li>a<li>b</ul><br/><p>");
        let options = DomSnapshotOptions {
            close_styles: true,
            lines: true,
        };
        let doc = parser.document();
        let snapshot = DomSnapshot::new(doc, doc.dom().root(), options);
        assert_eq!(
            snapshot.as_lines(),
            &[
                "#document @0",
                "  <ul> [explicit] @1",
                "    \"\\n\" @1",
                "    <li> [implicit] @2",
                "      \"a\" @2",
                "    <li> [auto] @2",
                "      \"b\" @2",
                "  <br> [brief] @2",
                "  <p> [auto] @2",
            ]
        );
    }

    #[test]
    fn render_html_follows_close_styles() {
        let input = "<!DOCTYPE html><p class='x' id=y>one<p>two<br><img src=\"a.png\"/></p><!--done-->";
        let parser = parse(input);
        assert_eq!(render_html(parser.document()), input);

        let doc = parser.document();
        let first_p = doc.dom().children(doc.dom().root())[1];
        assert_eq!(
            doc.dom().element(first_p).map(|element| element.close_style),
            Some(CloseStyle::Implicit)
        );
    }
}
