//! The streaming document parser.
//!
//! Runs as the consumer half of a byte pipeline: raw chunks arrive on
//! an input channel, filled entity [`Buffer`]s leave on an output
//! channel, and the document header is published once through a shared
//! [`HeaderCell`]. An empty chunk is the end-of-input marker and an
//! empty buffer is the end-of-output marker, so neither direction
//! needs a second message type.
//!
//! On a parse failure the header cell is fulfilled with the error and
//! the output channel is dropped without its end marker. A consumer
//! that sees the channel disconnect knows to collect the error from
//! the parser's result.

use crate::cell::HeaderCell;
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::header::Header;
use crate::tokenizer::{Attribute, MarkupEvent, Tokenizer};
use crossbeam_channel::{Receiver, Sender};
use plat_arena::{Buffer, ChangesetBuilder, NodeBuilder, RelationBuilder, WayBuilder};
use plat_core::{EntityFilter, ItemKind, Location, Member, NodeRef, Timestamp};
use smallvec::SmallVec;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The one format version this parser accepts.
const SUPPORTED_VERSION: &str = "0.6";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// No root element seen yet.
    Idle,
    /// Inside the root, before the first entity.
    ReadingHeader,
    /// Inside the root, at or after the first entity.
    ReadingBody,
    /// The root element has closed.
    Done,
}

/// Parses one document from a chunk channel into entity buffers.
///
/// Designed to run on its own thread via [`StreamingParser::run`],
/// with a [`Reader`](crate::reader::Reader) on the consuming side, but
/// it has no thread affinity of its own: tests drive it synchronously
/// by pre-loading the input channel.
pub struct StreamingParser {
    input: Receiver<Vec<u8>>,
    output: Sender<Buffer>,
    header_cell: Arc<HeaderCell>,
    filter: EntityFilter,
    cancel: Arc<AtomicBool>,
    config: ParserConfig,
    state: State,
    tokenizer: Tokenizer,
    buffer: Buffer,
    header: Header,
    header_published: bool,
    open_elements: Vec<String>,
    pending: Option<PendingEntity>,
    entities_since_flush: usize,
}

impl StreamingParser {
    /// A parser with default tuning.
    pub fn new(
        input: Receiver<Vec<u8>>,
        output: Sender<Buffer>,
        header_cell: Arc<HeaderCell>,
        filter: EntityFilter,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self::with_config(
            input,
            output,
            header_cell,
            filter,
            cancel,
            ParserConfig::new(),
        )
    }

    /// A parser with explicit tuning.
    pub fn with_config(
        input: Receiver<Vec<u8>>,
        output: Sender<Buffer>,
        header_cell: Arc<HeaderCell>,
        filter: EntityFilter,
        cancel: Arc<AtomicBool>,
        config: ParserConfig,
    ) -> Self {
        let buffer = Buffer::with_capacity(config.buffer_capacity);
        Self {
            input,
            output,
            header_cell,
            filter,
            cancel,
            config,
            state: State::Idle,
            tokenizer: Tokenizer::new(),
            buffer,
            header: Header::new(),
            header_published: false,
            open_elements: Vec::new(),
            pending: None,
            entities_since_flush: 0,
        }
    }

    /// Run the parse to completion.
    ///
    /// On success the end-of-output marker has been sent and the
    /// header cell is fulfilled. On failure the cell is fulfilled with
    /// the error, which is also returned.
    pub fn run(mut self) -> Result<(), ParseError> {
        match self.parse_loop() {
            Ok(()) => Ok(()),
            Err(error) => {
                self.header_cell.fulfill(Err(error.clone()));
                Err(error)
            }
        }
    }

    fn parse_loop(&mut self) -> Result<(), ParseError> {
        loop {
            if self.cancel.load(Ordering::Acquire) {
                return self.bail_out();
            }
            let chunk = match self.input.recv() {
                Ok(chunk) => chunk,
                // A dropped producer counts as end of input.
                Err(_) => Vec::new(),
            };
            if chunk.is_empty() {
                // A producer observing cancellation answers with this
                // marker too; re-check the flag so a cancelled parse
                // is not reported as a truncated document.
                return if self.cancel.load(Ordering::Acquire) {
                    self.bail_out()
                } else {
                    self.finish_input()
                };
            }
            if self.consume(&chunk)? {
                return self.bail_out();
            }
        }
    }

    /// Feed one chunk and process the events it completes. Returns
    /// `true` if cancellation was observed after an entity.
    fn consume(&mut self, chunk: &[u8]) -> Result<bool, ParseError> {
        self.tokenizer.feed(chunk)?;
        while let Some(event) = self.tokenizer.next_event() {
            if self.handle_event(event)? {
                self.maybe_flush();
                if self.cancel.load(Ordering::Acquire) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Returns `true` when the event completed a top-level element.
    fn handle_event(&mut self, event: MarkupEvent) -> Result<bool, ParseError> {
        match event {
            MarkupEvent::Open {
                name,
                attributes,
                self_closing,
                line,
                column,
            } => self.handle_open(name, attributes, self_closing, line, column),
            MarkupEvent::Close { name, line, column } => self.handle_close(name, line, column),
        }
    }

    fn handle_open(
        &mut self,
        name: String,
        attributes: SmallVec<[Attribute; 8]>,
        self_closing: bool,
        line: u64,
        column: u64,
    ) -> Result<bool, ParseError> {
        if self.state == State::Done {
            return Err(ParseError::markup(
                line,
                column,
                "content after the document root",
            ));
        }
        if self.state == State::Idle {
            return self.handle_root(name, attributes, self_closing, line, column);
        }
        let depth = self.open_elements.len();
        let mut closed_entity = false;
        if depth == 1 {
            if let Some(kind) = entity_kind(&name) {
                self.publish_header();
                self.state = State::ReadingBody;
                if self.filter.contains(kind) {
                    self.pending = Some(PendingEntity::new(kind, &attributes));
                }
                if self_closing {
                    closed_entity = self.finish_entity();
                }
            }
            // Anything else at this depth (<bounds>, <note>, ...) is
            // metadata with no record form and is skipped.
        } else if depth == 2 {
            if let Some(pending) = self.pending.as_mut() {
                pending.add_child(&name, &attributes);
            }
        }
        if !self_closing {
            self.open_elements.push(name);
        }
        Ok(closed_entity)
    }

    fn handle_root(
        &mut self,
        name: String,
        attributes: SmallVec<[Attribute; 8]>,
        self_closing: bool,
        line: u64,
        column: u64,
    ) -> Result<bool, ParseError> {
        if name != "osm" {
            return Err(ParseError::markup(
                line,
                column,
                format!("unexpected root element '<{name}>'"),
            ));
        }
        match attr(&attributes, "version") {
            None => {
                return Err(ParseError::Version {
                    version: String::new(),
                });
            }
            Some(version) if version != SUPPORTED_VERSION => {
                return Err(ParseError::Version {
                    version: version.to_string(),
                });
            }
            Some(version) => self.header.set_version(version),
        }
        for attribute in &attributes {
            self.header
                .set(attribute.name.as_str(), attribute.value.as_str());
        }
        if self_closing {
            self.publish_header();
            self.state = State::Done;
        } else {
            self.open_elements.push(name);
            self.state = State::ReadingHeader;
        }
        Ok(false)
    }

    fn handle_close(&mut self, name: String, line: u64, column: u64) -> Result<bool, ParseError> {
        let expected = match self.open_elements.pop() {
            Some(expected) => expected,
            None => {
                return Err(ParseError::markup(
                    line,
                    column,
                    format!("close tag '</{name}>' without an open element"),
                ));
            }
        };
        if expected != name {
            return Err(ParseError::markup(
                line,
                column,
                format!("mismatched close tag: expected '</{expected}>', found '</{name}>'"),
            ));
        }
        match self.open_elements.len() {
            0 => {
                self.publish_header();
                self.state = State::Done;
                Ok(false)
            }
            1 => Ok(self.finish_entity()),
            _ => Ok(false),
        }
    }

    /// Write out the entity being gathered, if any. Always reports a
    /// completed top-level element so the caller re-checks thresholds
    /// and cancellation.
    fn finish_entity(&mut self) -> bool {
        if let Some(pending) = self.pending.take() {
            pending.write_into(&mut self.buffer);
            self.entities_since_flush += 1;
        }
        true
    }

    /// Cleanly terminate at end of input.
    fn finish_input(&mut self) -> Result<(), ParseError> {
        self.tokenizer.finish()?;
        match self.state {
            State::Idle => {
                let (line, column) = self.tokenizer.position();
                Err(ParseError::markup(line, column, "no element found"))
            }
            State::ReadingHeader | State::ReadingBody => {
                let (line, column) = self.tokenizer.position();
                let detail = match self.open_elements.last() {
                    Some(name) => format!("unclosed element '<{name}>'"),
                    None => "unclosed element".to_string(),
                };
                Err(ParseError::markup(line, column, detail))
            }
            State::Done => {
                self.publish_header();
                self.push_current_buffer();
                let _ = self.output.send(Buffer::new());
                Ok(())
            }
        }
    }

    /// Stop early on cancellation: publish whatever header has been
    /// gathered, hand off complete entities, and end the stream as if
    /// the document had finished.
    fn bail_out(&mut self) -> Result<(), ParseError> {
        self.publish_header();
        self.push_current_buffer();
        let _ = self.output.send(Buffer::new());
        self.state = State::Done;
        Ok(())
    }

    fn publish_header(&mut self) {
        if self.header_published {
            return;
        }
        self.header_published = true;
        let header = std::mem::take(&mut self.header);
        self.header_cell.fulfill(Ok(header));
    }

    fn maybe_flush(&mut self) {
        if self.buffer.committed() >= self.config.flush_bytes
            || self.entities_since_flush >= self.config.flush_entities
        {
            self.push_current_buffer();
        }
    }

    fn push_current_buffer(&mut self) {
        if self.buffer.committed() == 0 {
            return;
        }
        let full = std::mem::replace(
            &mut self.buffer,
            Buffer::with_capacity(self.config.buffer_capacity),
        );
        let _ = self.output.send(full);
        self.entities_since_flush = 0;
    }
}

/// Attribute data for the entity currently being read, gathered until
/// its close tag arrives so the record can be written in one pass.
struct PendingEntity {
    kind: ItemKind,
    id: i64,
    version: u32,
    timestamp: Timestamp,
    location: Location,
    tags: Vec<(String, String)>,
    node_refs: Vec<NodeRef>,
    members: Vec<Member>,
}

impl PendingEntity {
    fn new(kind: ItemKind, attributes: &[Attribute]) -> Self {
        let id = parse_or_default(attr(attributes, "id"));
        let version = parse_or_default(attr(attributes, "version"));
        // Changeset dumps write created_at where everything else
        // writes timestamp.
        let timestamp = attr(attributes, "timestamp")
            .or_else(|| attr(attributes, "created_at"))
            .and_then(Timestamp::parse_iso)
            .unwrap_or(Timestamp::UNSET);
        let location = match (attr(attributes, "lon"), attr(attributes, "lat")) {
            (Some(lon), Some(lat)) => {
                Location::from_degrees(parse_or_default(Some(lon)), parse_or_default(Some(lat)))
            }
            _ => Location::undefined(),
        };
        Self {
            kind,
            id,
            version,
            timestamp,
            location,
            tags: Vec::new(),
            node_refs: Vec::new(),
            members: Vec::new(),
        }
    }

    fn add_child(&mut self, name: &str, attributes: &[Attribute]) {
        match name {
            "tag" => {
                // Keys are mandatory in the record layout; a pair
                // without one is dropped.
                if let Some(key) = attr(attributes, "k") {
                    if !key.is_empty() {
                        let value = attr(attributes, "v").unwrap_or("");
                        self.tags.push((key.to_string(), value.to_string()));
                    }
                }
            }
            "nd" => {
                let id: i64 = parse_or_default(attr(attributes, "ref"));
                self.node_refs.push(NodeRef::new(id));
            }
            "member" => {
                let id: i64 = parse_or_default(attr(attributes, "ref"));
                let kind = match attr(attributes, "type") {
                    Some("node") => Some(ItemKind::Node),
                    Some("way") => Some(ItemKind::Way),
                    Some("relation") => Some(ItemKind::Relation),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.members.push(Member::new(kind, id));
                }
            }
            _ => {}
        }
    }

    fn write_into(self, buffer: &mut Buffer) {
        match self.kind {
            ItemKind::Node => {
                let mut builder =
                    NodeBuilder::new(buffer, self.id, self.version, self.timestamp, self.location);
                for (key, value) in &self.tags {
                    builder.add_tag(key, value);
                }
                builder.finish();
            }
            ItemKind::Way => {
                let mut builder = WayBuilder::new(buffer, self.id, self.version, self.timestamp);
                for node_ref in self.node_refs {
                    builder.add_node_ref(node_ref);
                }
                for (key, value) in &self.tags {
                    builder.add_tag(key, value);
                }
                builder.finish();
            }
            ItemKind::Relation => {
                let mut builder =
                    RelationBuilder::new(buffer, self.id, self.version, self.timestamp);
                for member in self.members {
                    builder.add_member(member);
                }
                for (key, value) in &self.tags {
                    builder.add_tag(key, value);
                }
                builder.finish();
            }
            ItemKind::Changeset => {
                let mut builder =
                    ChangesetBuilder::new(buffer, self.id, self.version, self.timestamp);
                for (key, value) in &self.tags {
                    builder.add_tag(key, value);
                }
                builder.finish();
            }
            // Documents carry no area elements; areas exist only
            // through the arena API.
            _ => {}
        }
    }
}

fn attr<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attribute| attribute.name == name)
        .map(|attribute| attribute.value.as_str())
}

/// Numeric attributes parse leniently: a missing or malformed value
/// becomes the type's default rather than an error.
fn parse_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn entity_kind(name: &str) -> Option<ItemKind> {
    match name {
        "node" => Some(ItemKind::Node),
        "way" => Some(ItemKind::Way),
        "relation" => Some(ItemKind::Relation),
        "changeset" => Some(ItemKind::Changeset),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use plat_arena::EntityRef;

    type Outcome = (
        Result<(), ParseError>,
        Vec<Buffer>,
        Result<Header, ParseError>,
    );

    fn parse_document(doc: &str) -> Outcome {
        parse_with(doc, EntityFilter::all(), ParserConfig::new())
    }

    fn parse_with(doc: &str, filter: EntityFilter, config: ParserConfig) -> Outcome {
        let (chunk_tx, chunk_rx) = unbounded();
        let (buffer_tx, buffer_rx) = unbounded();
        let cell = Arc::new(HeaderCell::new());
        let cancel = Arc::new(AtomicBool::new(false));
        chunk_tx.send(doc.as_bytes().to_vec()).unwrap();
        chunk_tx.send(Vec::new()).unwrap();
        let parser = StreamingParser::with_config(
            chunk_rx,
            buffer_tx,
            Arc::clone(&cell),
            filter,
            cancel,
            config,
        );
        let result = parser.run();
        let buffers: Vec<Buffer> = buffer_rx.try_iter().collect();
        let header = cell.wait();
        (result, buffers, header)
    }

    fn collect_entities(buffers: &[Buffer]) -> Vec<EntityRef<'_>> {
        buffers.iter().flat_map(Buffer::entities).collect()
    }

    const NODES_DOC: &str = "<?xml version='1.0' encoding='UTF-8'?>\n\
        <osm version=\"0.6\" generator=\"testdata\" upload=\"false\">\n\
        <node id=\"36966060\" version=\"1\" timestamp=\"2015-07-01T12:30:45Z\" lon=\"8.3628851\" lat=\"49.0189506\"/>\n\
        <node id=\"36966061\" version=\"1\" timestamp=\"2015-07-01T12:30:45Z\" lon=\"8.3629027\" lat=\"49.0193268\"/>\n\
        <node id=\"36966062\" version=\"1\" timestamp=\"2015-07-01T12:30:45Z\" lon=\"8.3629674\" lat=\"49.0199971\"/>\n\
        </osm>\n";

    #[test]
    fn no_data_document_publishes_header_then_end() {
        let (result, buffers, header) =
            parse_document("<osm version=\"0.6\" generator=\"testdata\" upload=\"false\"/>");
        result.unwrap();
        let header = header.unwrap();
        assert_eq!(header.version(), "0.6");
        assert_eq!(header.get("generator"), Some("testdata"));
        assert_eq!(buffers.len(), 1);
        assert!(buffers[0].is_empty());
    }

    #[test]
    fn missing_version_is_rejected() {
        let (result, buffers, header) = parse_document("<osm generator=\"testdata\"></osm>");
        let error = result.unwrap_err();
        assert_eq!(
            error,
            ParseError::Version {
                version: String::new()
            }
        );
        assert_eq!(header.unwrap_err(), error);
        assert!(buffers.is_empty());
    }

    #[test]
    fn old_versions_are_rejected() {
        for version in ["0.1", "0.5"] {
            let doc = format!("<osm version=\"{version}\"></osm>");
            let (result, _, header) = parse_document(&doc);
            let error = result.unwrap_err();
            assert_eq!(
                error,
                ParseError::Version {
                    version: version.to_string()
                }
            );
            assert_eq!(header.unwrap_err(), error);
        }
    }

    #[test]
    fn empty_input_fails_at_line_one_column_zero() {
        let (result, buffers, header) = parse_document("");
        let error = result.unwrap_err();
        assert_eq!(error, ParseError::markup(1, 0, "no element found"));
        assert_eq!(header.unwrap_err(), error);
        assert!(buffers.is_empty());
    }

    #[test]
    fn nodes_round_trip() {
        let (result, buffers, header) = parse_document(NODES_DOC);
        result.unwrap();
        assert_eq!(header.unwrap().version(), "0.6");
        let entities = collect_entities(&buffers);
        assert_eq!(entities.len(), 3);
        match &entities[0] {
            EntityRef::Node(node) => {
                assert_eq!(node.id().0, 36_966_060);
                assert_eq!(node.version(), 1);
                assert_eq!(node.timestamp().seconds(), 1_435_753_845);
                assert_eq!(node.location().x(), 83_628_851);
                assert_eq!(node.location().y(), 490_189_506);
                assert!(node.tags().is_empty());
            }
            other => panic!("expected a node, got {other:?}"),
        }
        let ids: Vec<i64> = entities.iter().map(|e| e.id().0).collect();
        assert_eq!(ids, vec![36_966_060, 36_966_061, 36_966_062]);
    }

    #[test]
    fn way_node_refs_arrive_in_order() {
        let doc = "<osm version=\"0.6\">\n\
            <way id=\"20\" version=\"3\" timestamp=\"2015-07-01T12:30:45Z\">\n\
            <nd ref=\"11\"/><nd ref=\"12\"/><nd ref=\"13\"/>\n\
            <tag k=\"highway\" v=\"primary\"/>\n\
            </way>\n\
            </osm>\n";
        let (result, buffers, _) = parse_document(doc);
        result.unwrap();
        let entities = collect_entities(&buffers);
        assert_eq!(entities.len(), 1);
        match &entities[0] {
            EntityRef::Way(way) => {
                assert_eq!(way.id().0, 20);
                assert_eq!(way.version(), 3);
                let refs: Vec<i64> = way.nodes().iter().map(|n| n.id().0).collect();
                assert_eq!(refs, vec![11, 12, 13]);
                assert_eq!(way.tags().get("highway"), Some("primary"));
            }
            other => panic!("expected a way, got {other:?}"),
        }
    }

    #[test]
    fn relation_members_keep_kind_and_order() {
        let doc = "<osm version=\"0.6\">\n\
            <relation id=\"31\" version=\"2\" timestamp=\"2015-07-01T12:30:45Z\">\n\
            <member type=\"node\" ref=\"11\" role=\"label\"/>\n\
            <member type=\"way\" ref=\"20\" role=\"outer\"/>\n\
            <member type=\"boundary\" ref=\"99\" role=\"\"/>\n\
            <member type=\"relation\" ref=\"30\" role=\"\"/>\n\
            <tag k=\"type\" v=\"multipolygon\"/>\n\
            </relation>\n\
            </osm>\n";
        let (result, buffers, _) = parse_document(doc);
        result.unwrap();
        let entities = collect_entities(&buffers);
        match &entities[0] {
            EntityRef::Relation(relation) => {
                let members: Vec<Member> = relation.members().iter().collect();
                assert_eq!(members.len(), 3);
                assert_eq!(members[0].kind(), ItemKind::Node);
                assert_eq!(members[0].id().0, 11);
                assert_eq!(members[1].kind(), ItemKind::Way);
                assert_eq!(members[1].id().0, 20);
                assert_eq!(members[2].kind(), ItemKind::Relation);
                assert_eq!(members[2].id().0, 30);
                assert_eq!(relation.tags().get("type"), Some("multipolygon"));
            }
            other => panic!("expected a relation, got {other:?}"),
        }
    }

    #[test]
    fn changeset_falls_back_to_created_at() {
        let doc = "<osm version=\"0.6\">\n\
            <changeset id=\"42\" created_at=\"2015-07-01T20:15:22Z\">\n\
            <tag k=\"comment\" v=\"fix\"/>\n\
            </changeset>\n\
            </osm>\n";
        let (result, buffers, _) = parse_document(doc);
        result.unwrap();
        let entities = collect_entities(&buffers);
        match &entities[0] {
            EntityRef::Changeset(changeset) => {
                assert_eq!(changeset.id().0, 42);
                assert_eq!(changeset.version(), 0);
                assert_eq!(changeset.timestamp().seconds(), 1_435_781_722);
                assert_eq!(changeset.tags().get("comment"), Some("fix"));
            }
            other => panic!("expected a changeset, got {other:?}"),
        }
    }

    #[test]
    fn tag_values_decode_character_references() {
        let doc = "<osm version=\"0.6\">\n\
            <node id=\"1\" version=\"1\" lon=\"0.1\" lat=\"0.2\">\n\
            <tag k=\"name\" v=\"Foo &amp; Bar\"/>\n\
            <tag k=\"\" v=\"dropped\"/>\n\
            </node>\n\
            </osm>\n";
        let (result, buffers, _) = parse_document(doc);
        result.unwrap();
        let entities = collect_entities(&buffers);
        match &entities[0] {
            EntityRef::Node(node) => {
                assert_eq!(node.tags().len(), 1);
                assert_eq!(node.tags().get("name"), Some("Foo & Bar"));
            }
            other => panic!("expected a node, got {other:?}"),
        }
    }

    #[test]
    fn filter_drops_unselected_kinds() {
        let doc = "<osm version=\"0.6\">\n\
            <node id=\"1\" version=\"1\" lon=\"0.1\" lat=\"0.2\"/>\n\
            <way id=\"2\" version=\"1\"><nd ref=\"1\"/></way>\n\
            <relation id=\"3\" version=\"1\"><member type=\"way\" ref=\"2\" role=\"\"/></relation>\n\
            </osm>\n";
        let (result, buffers, _) = parse_with(doc, EntityFilter::WAYS, ParserConfig::new());
        result.unwrap();
        let entities = collect_entities(&buffers);
        assert_eq!(entities.len(), 1);
        assert!(matches!(entities[0], EntityRef::Way(_)));
    }

    #[test]
    fn per_entity_flush_yields_one_buffer_each() {
        let mut config = ParserConfig::new();
        config.flush_entities = 1;
        let (result, buffers, _) = parse_with(NODES_DOC, EntityFilter::all(), config);
        result.unwrap();
        assert_eq!(buffers.len(), 4);
        assert!(buffers[3].is_empty());
        for buffer in &buffers[..3] {
            assert_eq!(buffer.entities().count(), 1);
        }
    }

    #[test]
    fn mismatched_close_tag_is_rejected() {
        let (result, _, _) = parse_document("<osm version=\"0.6\"><node id=\"1\"></way></osm>");
        match result.unwrap_err() {
            ParseError::Markup { detail, .. } => {
                assert_eq!(
                    detail,
                    "mismatched close tag: expected '</node>', found '</way>'"
                );
            }
            other => panic!("expected a markup error, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_element_is_rejected() {
        let (result, _, header) = parse_document("<osm version=\"0.6\"><node id=\"1\">");
        match result.unwrap_err() {
            ParseError::Markup { detail, .. } => {
                assert_eq!(detail, "unclosed element '<node>'");
            }
            other => panic!("expected a markup error, got {other:?}"),
        }
        // The entity was reached, so the header went out before the
        // failure and stays good.
        assert_eq!(header.unwrap().version(), "0.6");
    }

    #[test]
    fn stray_close_tag_is_rejected() {
        let (result, _, _) = parse_document("</osm>");
        match result.unwrap_err() {
            ParseError::Markup { line, column, detail } => {
                assert_eq!((line, column), (1, 0));
                assert_eq!(detail, "close tag '</osm>' without an open element");
            }
            other => panic!("expected a markup error, got {other:?}"),
        }
    }

    #[test]
    fn second_root_element_is_rejected() {
        let (result, buffers, header) =
            parse_document("<osm version=\"0.6\"></osm><osm version=\"0.6\"/>");
        match result.unwrap_err() {
            ParseError::Markup { detail, .. } => {
                assert_eq!(detail, "content after the document root");
            }
            other => panic!("expected a markup error, got {other:?}"),
        }
        // The first root completed, so its header won the cell.
        assert_eq!(header.unwrap().version(), "0.6");
        assert!(buffers.is_empty());
    }

    #[test]
    fn unexpected_root_element_is_rejected() {
        let (result, _, _) = parse_document("<planet version=\"0.6\"></planet>");
        match result.unwrap_err() {
            ParseError::Markup { detail, .. } => {
                assert_eq!(detail, "unexpected root element '<planet>'");
            }
            other => panic!("expected a markup error, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_before_input_ends_the_stream() {
        let (_chunk_tx, chunk_rx) = unbounded::<Vec<u8>>();
        let (buffer_tx, buffer_rx) = unbounded();
        let cell = Arc::new(HeaderCell::new());
        let cancel = Arc::new(AtomicBool::new(true));
        let parser = StreamingParser::new(
            chunk_rx,
            buffer_tx,
            Arc::clone(&cell),
            EntityFilter::all(),
            cancel,
        );
        parser.run().unwrap();
        let buffers: Vec<Buffer> = buffer_rx.try_iter().collect();
        assert_eq!(buffers.len(), 1);
        assert!(buffers[0].is_empty());
        let header = cell.wait().unwrap();
        assert_eq!(header.version(), "");
        assert!(header.is_empty());
    }

    #[test]
    fn cancellation_racing_the_end_of_input_stays_clean() {
        let (chunk_tx, chunk_rx) = unbounded();
        let (buffer_tx, buffer_rx) = unbounded();
        let cell = Arc::new(HeaderCell::new());
        let cancel = Arc::new(AtomicBool::new(false));
        let mut config = ParserConfig::new();
        config.flush_entities = 1;
        let parser = StreamingParser::with_config(
            chunk_rx,
            buffer_tx,
            Arc::clone(&cell),
            EntityFilter::all(),
            Arc::clone(&cancel),
            config,
        );
        let worker = std::thread::spawn(move || parser.run());

        let doc = "<osm version=\"0.6\">\n\
            <node id=\"1\" version=\"1\" lon=\"0.1\" lat=\"0.2\"/>\n";
        chunk_tx.send(doc.as_bytes().to_vec()).unwrap();
        // The flushed buffer proves the entity landed and the parser is
        // waiting for more input.
        let first = buffer_rx.recv().unwrap();
        assert_eq!(first.entities().count(), 1);

        // A producer that observes cancellation mid-document sends no
        // more data, only the end-of-input marker. The parser must
        // treat that as a clean stop, not a truncated document.
        cancel.store(true, Ordering::Release);
        chunk_tx.send(Vec::new()).unwrap();

        worker.join().unwrap().unwrap();
        assert_eq!(cell.wait().unwrap().version(), "0.6");
        let last = buffer_rx.recv().unwrap();
        assert!(last.is_empty());
    }

    #[test]
    fn leading_character_data_is_ignored() {
        let (result, _, header) = parse_document("\u{feff}\n<osm version=\"0.6\"/>");
        result.unwrap();
        assert_eq!(header.unwrap().version(), "0.6");
    }

    #[test]
    fn metadata_elements_are_skipped() {
        let doc = "<osm version=\"0.6\">\n\
            <bounds minlat=\"49.0\" minlon=\"8.3\" maxlat=\"49.1\" maxlon=\"8.4\"/>\n\
            <node id=\"1\" version=\"1\" lon=\"8.35\" lat=\"49.05\"/>\n\
            </osm>\n";
        let (result, buffers, _) = parse_document(doc);
        result.unwrap();
        let entities = collect_entities(&buffers);
        assert_eq!(entities.len(), 1);
        assert!(matches!(entities[0], EntityRef::Node(_)));
    }
}
