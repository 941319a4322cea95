//! Incremental parse session: scanner, event buffering, cursor and filters.
//!
//! Committing an event follows a fixed pipeline:
//! - open tag: apply optional-close rules, attach a new element under the
//!   current node, notify, then make it current (void and self-closing
//!   elements close immediately);
//! - close tag: close the innermost open element with that name, auto-closing
//!   anything opened inside it; unmatched close tags are ignored;
//! - text and leaf markup: attach under the current node;
//! - end of document: auto-close whatever is still open.
//!
//! Malformed input never fails the parse; anomalies are recorded as
//! [`ParseDiagnostic`]s.

mod buffer;
mod close_policy;
mod stack;


use crate::decode::ChunkDecoder;
use crate::document::Document;
use crate::dom::{Attribute, CloseStyle, NodeId, NodeKind};
use crate::error::{DiagnosticCode, ParseDiagnostic, ParseError};
use crate::event::{Event, EventKind};
use crate::filter::{HtmlFilter, Notification};
use crate::lexer::HtmlLexer;
use crate::symbol::Symbol;
use buffer::EventQueue;
use close_policy::{closes_on_open, is_void_element};
use stack::{CursorStack, OpenElement};

#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Append text to a directly preceding Characters sibling instead of
    /// creating a new node.
    pub coalesce_characters: bool,
    /// Queue events until `flush_buffer` instead of committing them.
    pub buffer_events: bool,
    /// Apply HTML optional end-tag rules (`p`, `li`, `td`, ...).
    pub optional_close: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            coalesce_characters: true,
            buffer_events: false,
            optional_close: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseState {
    Start,
    InDocument,
    Finished,
}

/// One parse session owning one [`Document`].
pub struct HtmlParse {
    config: ParserConfig,
    doc: Document,
    lexer: HtmlLexer,
    decoder: ChunkDecoder,
    cursor: CursorStack,
    queue: EventQueue,
    filters: Vec<Box<dyn HtmlFilter>>,
    state: ParseState,
    diagnostics: Vec<ParseDiagnostic>,
    scratch: Vec<Event>,
    decoded: String,
    flush_pending: bool,
}

impl HtmlParse {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            doc: Document::default(),
            lexer: HtmlLexer::new(),
            decoder: ChunkDecoder::new(),
            cursor: CursorStack::default(),
            queue: EventQueue::default(),
            filters: Vec::new(),
            state: ParseState::Start,
            diagnostics: Vec::new(),
            scratch: Vec::new(),
            decoded: String::new(),
            flush_pending: false,
        }
    }

    /// Register a filter; filters run in registration order.
    pub fn add_filter(&mut self, filter: Box<dyn HtmlFilter>) {
        log::debug!(target: "html_parse.engine", "add filter {}", filter.name());
        self.filters.push(filter);
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    pub fn start_parse(&mut self, url: &str) -> Result<(), ParseError> {
        match self.state {
            ParseState::Start => {
                self.doc.set_url(url);
                self.begin_document();
                Ok(())
            }
            ParseState::InDocument => Err(ParseError::AlreadyStarted),
            ParseState::Finished => Err(ParseError::AlreadyFinished),
        }
    }

    /// Feed a chunk of text. Markup split across chunks is held back until
    /// it is complete.
    pub fn parse_text(&mut self, text: &str) -> Result<(), ParseError> {
        self.ensure_not_finished()?;
        // A dangling partial UTF-8 sequence cannot be continued by text.
        let mut decoded = std::mem::take(&mut self.decoded);
        self.decoder.finish(&mut decoded);
        decoded.push_str(text);
        self.feed_lexer(&decoded);
        decoded.clear();
        self.decoded = decoded;
        Ok(())
    }

    /// Feed a chunk of UTF-8 bytes; sequences split across chunks are
    /// reassembled and invalid bytes decode to U+FFFD.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        self.ensure_not_finished()?;
        let mut decoded = std::mem::take(&mut self.decoded);
        self.decoder.push(bytes, &mut decoded);
        self.feed_lexer(&decoded);
        decoded.clear();
        self.decoded = decoded;
        Ok(())
    }

    /// Emit text held back by the scanner, then notify filters.
    ///
    /// Buffered events stay queued; `flush_buffer` controls those. While
    /// events are queued the `flush` notification waits for them, so filters
    /// never see it ahead of earlier content.
    pub fn flush(&mut self) -> Result<(), ParseError> {
        self.ensure_not_finished()?;
        let mut events = std::mem::take(&mut self.scratch);
        self.lexer.flush_text(&mut events);
        self.emit_all(&mut events);
        self.scratch = events;
        if !self.queue.is_empty() {
            self.flush_pending = true;
        } else if self.state == ParseState::InDocument {
            self.notify(Notification::Flush);
        }
        Ok(())
    }

    /// Drain the scanner, emit end-of-document and commit everything queued.
    pub fn finish_parse(&mut self) -> Result<(), ParseError> {
        self.ensure_not_finished()?;
        let mut decoded = std::mem::take(&mut self.decoded);
        self.decoder.finish(&mut decoded);
        let mut events = std::mem::take(&mut self.scratch);
        let symbols = self.doc.symbols_mut();
        self.lexer.feed(&decoded, symbols, &mut events);
        self.lexer.finish(symbols, &mut events);
        events.push(Event::end_of_document().at_line(self.lexer.line()));
        self.emit_all(&mut events);
        self.scratch = events;
        decoded.clear();
        self.decoded = decoded;
        self.flush_buffer();
        Ok(())
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<ParseDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// The node new content attaches to: the innermost live open element,
    /// or the root.
    pub fn current(&self) -> NodeId {
        let dom = self.doc.dom();
        self.cursor
            .iter_nodes()
            .rev()
            .find(|&node| dom.contains(node))
            .unwrap_or(NodeId::ROOT)
    }

    /// Number of elements currently open.
    pub fn open_element_count(&self) -> usize {
        self.cursor.len()
    }

    pub fn coalesce_characters(&self) -> bool {
        self.config.coalesce_characters
    }

    pub fn buffer_events(&self) -> bool {
        self.config.buffer_events
    }

    /// Turn event buffering on or off. Turning it off commits anything
    /// queued first, so events are never committed out of order.
    pub fn set_buffer_events(&mut self, on: bool) {
        if !on && !self.queue.is_empty() {
            self.flush_buffer();
        }
        self.config.buffer_events = on;
    }

    /// Commit every queued event in arrival order; returns how many.
    pub fn flush_buffer(&mut self) -> usize {
        let mut committed = 0;
        while let Some(event) = self.queue.pop() {
            self.commit(event);
            committed += 1;
        }
        self.release_pending_flush();
        committed
    }

    /// Drop queued events without committing them; returns how many.
    pub fn discard_buffer(&mut self) -> usize {
        let dropped = self.queue.clear();
        if dropped > 0 {
            log::debug!(target: "html_parse.engine", "discarded {dropped} buffered events");
        }
        self.release_pending_flush();
        dropped
    }

    pub fn buffered_len(&self) -> usize {
        self.queue.len()
    }

    /// Route an event into the session: queue it while buffering, commit it
    /// otherwise.
    pub(crate) fn emit(&mut self, event: Event) {
        if self.state == ParseState::Finished {
            self.drop_after_end(&event);
            return;
        }
        if self.config.buffer_events {
            self.queue.push(event);
        } else {
            self.commit(event);
        }
    }

    /// Make `node` the current node; the cursor is rebuilt from its ancestor
    /// chain. Only elements and the root are accepted.
    ///
    /// Elements on the chain that were already closed keep their recorded
    /// close style; closing them again later only pops them.
    #[cfg(any(test, feature = "test-harness"))]
    pub(crate) fn set_current(&mut self, node: NodeId) -> Result<(), crate::error::TreeError> {
        use crate::error::{InvalidTreeReason, TreeError};

        let dom = self.doc.dom();
        match dom.live(node)?.kind() {
            NodeKind::Document | NodeKind::Element => {}
            _ => return Err(TreeError::invalid(node, InvalidTreeReason::NotAContainer)),
        }
        let mut chain = Vec::new();
        let mut next = Some(node);
        // A corrupted graph may contain a parent cycle; never walk more links
        // than there are nodes.
        let mut budget = dom.len();
        while let Some(id) = next {
            if budget == 0 {
                return Err(TreeError::invalid(id, InvalidTreeReason::Cycle));
            }
            budget -= 1;
            if let Some(element) = dom.element(id) {
                chain.push(OpenElement::new(id, element.name));
            }
            next = dom.parent(id);
        }
        self.cursor.clear();
        for entry in chain.into_iter().rev() {
            self.cursor.push(entry);
        }
        Ok(())
    }

    /// Not retroactive: existing Characters nodes are left as they are.
    #[cfg(any(test, feature = "test-harness"))]
    pub(crate) fn set_coalesce_characters(&mut self, on: bool) {
        self.config.coalesce_characters = on;
    }

    #[cfg(any(test, feature = "test-harness"))]
    pub(crate) fn symbol_table_size(&self) -> usize {
        self.doc.symbols().len()
    }

    fn release_pending_flush(&mut self) {
        if std::mem::take(&mut self.flush_pending) && self.state == ParseState::InDocument {
            self.notify(Notification::Flush);
        }
    }

    fn ensure_not_finished(&self) -> Result<(), ParseError> {
        if self.state == ParseState::Finished {
            return Err(ParseError::AlreadyFinished);
        }
        Ok(())
    }

    fn feed_lexer(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut events = std::mem::take(&mut self.scratch);
        self.lexer.feed(text, self.doc.symbols_mut(), &mut events);
        self.emit_all(&mut events);
        self.scratch = events;
    }

    fn emit_all(&mut self, events: &mut Vec<Event>) {
        for event in events.drain(..) {
            self.emit(event);
        }
    }

    fn begin_document(&mut self) {
        log::debug!(target: "html_parse.engine", "start document {:?}", self.doc.url());
        self.state = ParseState::InDocument;
        self.notify(Notification::StartDocument);
    }

    fn commit(&mut self, event: Event) {
        match self.state {
            ParseState::Finished => {
                self.drop_after_end(&event);
                return;
            }
            ParseState::Start => self.begin_document(),
            ParseState::InDocument => {}
        }
        log::trace!(target: "html_parse.engine", "commit line {}: {:?}", event.line, event.kind);
        let Event { kind, line } = event;
        match kind {
            EventKind::OpenTag {
                name,
                attributes,
                self_closing,
            } => self.open_element(name, attributes, self_closing, line),
            EventKind::CloseTag { name } => self.close_element(name, line),
            EventKind::Characters(text) => self.add_characters(text, line),
            EventKind::Comment(text) => {
                let node = self.doc.dom_mut().create_comment(text, line);
                self.attach(node);
                self.notify(Notification::Comment(node));
            }
            EventKind::Directive(text) => {
                let node = self.doc.dom_mut().create_directive(text, line);
                self.attach(node);
                self.notify(Notification::Directive(node));
            }
            EventKind::Cdata(text) => {
                let node = self.doc.dom_mut().create_cdata(text, line);
                self.attach(node);
                self.notify(Notification::Cdata(node));
            }
            EventKind::EndOfDocument => self.end_document(),
        }
        #[cfg(all(debug_assertions, feature = "parser-invariants"))]
        if let Err(err) = self.doc.dom().check_invariants() {
            panic!("tree invariant violated after commit at line {line}: {err}");
        }
    }

    fn open_element(
        &mut self,
        name: Symbol,
        attributes: Vec<Attribute>,
        self_closing: bool,
        line: u32,
    ) {
        let (void, incoming) = match self.doc.symbols().resolve_arc(name) {
            Some(text) => (is_void_element(&text), Some(text)),
            None => (false, None),
        };
        if self.config.optional_close {
            if let Some(incoming) = incoming {
                self.apply_optional_close(&incoming);
            }
        }
        let node = self.doc.dom_mut().create_element(name, attributes, line);
        self.attach(node);
        self.notify(Notification::StartElement(node));
        if self_closing {
            self.finish_element(node, CloseStyle::Brief);
        } else if void {
            self.finish_element(node, CloseStyle::Void);
        } else {
            self.cursor.push(OpenElement::new(node, name));
        }
    }

    fn apply_optional_close(&mut self, incoming: &str) {
        loop {
            self.prune_stale_cursor();
            let Some(top) = self.cursor.current() else {
                return;
            };
            let closes = self
                .doc
                .symbols()
                .resolve(top.name)
                .is_some_and(|current| closes_on_open(current, incoming));
            if !closes {
                return;
            }
            self.cursor.pop();
            self.finish_element(top.node, CloseStyle::Implicit);
        }
    }

    fn close_element(&mut self, name: Symbol, line: u32) {
        let tag = self
            .doc
            .symbols()
            .resolve_arc(name)
            .unwrap_or_else(|| "".into());
        if is_void_element(&tag) {
            return;
        }
        self.prune_stale_cursor();
        let Some(index) = self.cursor.position_of(name) else {
            self.diagnose(
                DiagnosticCode::UnmatchedCloseTag,
                line,
                format!("</{tag}> does not match any open element"),
            );
            return;
        };
        if index + 1 < self.cursor.len() {
            self.diagnose(
                DiagnosticCode::MisnestedCloseTag,
                line,
                format!(
                    "</{tag}> closes {} unclosed inner element(s)",
                    self.cursor.len() - index - 1
                ),
            );
        }
        let inner: Vec<OpenElement> = self.cursor.pop_above(index).collect();
        for entry in inner {
            self.finish_element(entry.node, CloseStyle::AutoClose);
        }
        if let Some(entry) = self.cursor.pop() {
            self.finish_element(entry.node, CloseStyle::Explicit);
        }
    }

    fn add_characters(&mut self, text: String, line: u32) {
        if text.is_empty() {
            return;
        }
        self.prune_stale_cursor();
        let parent = self.current();
        if self.config.coalesce_characters {
            if let Some(last) = self.doc.dom().last_child(parent) {
                if self.doc.dom().kind(last) == Some(NodeKind::Characters) {
                    if let Some(existing) = self.doc.dom_mut().text_mut(last) {
                        existing.push_str(&text);
                        self.notify(Notification::Characters(last));
                        return;
                    }
                }
            }
        }
        let node = self.doc.dom_mut().create_characters(text, line);
        self.attach(node);
        self.notify(Notification::Characters(node));
    }

    fn end_document(&mut self) {
        let open = self.cursor.len();
        while let Some(entry) = self.cursor.pop() {
            self.finish_element(entry.node, CloseStyle::AutoClose);
        }
        self.state = ParseState::Finished;
        log::debug!(
            target: "html_parse.engine",
            "end document: {} nodes, {open} left open, max depth {}",
            self.doc.dom().len(),
            self.cursor.max_depth()
        );
        self.notify(Notification::EndDocument);
    }

    /// Attach a freshly created node under the current node.
    fn attach(&mut self, node: NodeId) {
        self.prune_stale_cursor();
        let parent = self.current();
        if let Err(err) = self.doc.dom_mut().append_child(parent, node) {
            log::error!(target: "html_parse.engine", "cannot attach {node:?} under {parent:?}: {err}");
            debug_assert!(false, "attach failed: {err}");
        }
    }

    /// Record `style` and notify `end_element`, once per element.
    fn finish_element(&mut self, node: NodeId, style: CloseStyle) {
        let Some(element) = self.doc.dom_mut().element_mut(node) else {
            return;
        };
        if element.close_style != CloseStyle::Unclosed {
            return;
        }
        element.close_style = style;
        self.notify(Notification::EndElement(node));
    }

    /// Pop cursor entries whose elements a filter deleted.
    fn prune_stale_cursor(&mut self) {
        while let Some(top) = self.cursor.current() {
            if self.doc.dom().contains(top.node) {
                return;
            }
            log::trace!(target: "html_parse.engine", "dropping deleted {:?} from cursor", top.node);
            self.cursor.pop();
        }
    }

    fn notify(&mut self, notification: Notification) {
        for filter in self.filters.iter_mut() {
            notification.deliver(filter.as_mut(), &mut self.doc);
        }
    }

    fn drop_after_end(&mut self, event: &Event) {
        self.diagnose(
            DiagnosticCode::EventAfterEnd,
            event.line,
            format!("{:?} after end of document", event.kind),
        );
    }

    fn diagnose(&mut self, code: DiagnosticCode, line: u32, message: String) {
        let diagnostic = ParseDiagnostic {
            code,
            line,
            message,
        };
        log::debug!(target: "html_parse.engine", "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

impl Default for HtmlParse {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}
