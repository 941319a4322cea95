//! Element closing rules: void elements and optional end tags.
//!
//! Names are compared after ASCII folding, so callers pass resolved,
//! canonical symbol text.

/// Elements that never have content or an end tag.
pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Whether an open `current` element is implicitly closed by an incoming
/// `incoming` open tag.
pub(crate) fn closes_on_open(current: &str, incoming: &str) -> bool {
    match current {
        "p" => matches!(
            incoming,
            "address"
                | "article"
                | "aside"
                | "blockquote"
                | "div"
                | "dl"
                | "fieldset"
                | "footer"
                | "form"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "header"
                | "hr"
                | "nav"
                | "ol"
                | "p"
                | "pre"
                | "section"
                | "table"
                | "ul"
        ),
        "li" => incoming == "li",
        "option" => matches!(incoming, "option" | "optgroup"),
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "tr" => incoming == "tr",
        "td" | "th" => matches!(incoming, "td" | "th" | "tr"),
        "thead" | "tbody" => matches!(incoming, "tbody" | "tfoot"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{closes_on_open, is_void_element};

    #[test]
    fn void_elements() {
        for name in ["br", "img", "input", "meta", "link", "hr", "wbr"] {
            assert!(is_void_element(name), "{name}");
        }
        for name in ["div", "p", "script", "BR"] {
            assert!(!is_void_element(name), "{name}");
        }
    }

    #[test]
    fn optional_close_pairs() {
        assert!(closes_on_open("p", "div"));
        assert!(closes_on_open("p", "p"));
        assert!(!closes_on_open("p", "span"));
        assert!(closes_on_open("li", "li"));
        assert!(!closes_on_open("li", "ul"));
        assert!(closes_on_open("td", "th"));
        assert!(closes_on_open("th", "tr"));
        assert!(closes_on_open("tr", "tr"));
        assert!(!closes_on_open("tr", "td"));
        assert!(closes_on_open("dd", "dt"));
        assert!(closes_on_open("option", "optgroup"));
        assert!(!closes_on_open("div", "div"));
    }
}
