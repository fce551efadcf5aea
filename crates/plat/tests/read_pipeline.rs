//! End-to-end pipeline coverage through the facade crate.
//!
//! Every test here runs the real thing: a producer thread pulling from
//! an `io::Read` source, a parser thread filling entity buffers, and
//! the blocking `Reader` interface on the consuming side.

use plat::prelude::*;
use plat_test_utils::fixtures;
use std::io;
use std::thread;
use std::time::Duration;

// ── Helpers ─────────────────────────────────────────────────────

/// A byte source that yields at most `step` bytes per read call, so
/// markup constructs arrive split across many pipeline chunks.
struct Trickle {
    data: &'static [u8],
    at: usize,
    step: usize,
}

impl io::Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len() - self.at);
        buf[..n].copy_from_slice(&self.data[self.at..self.at + n]);
        self.at += n;
        Ok(n)
    }
}

/// A byte source that hands over a document prefix in one read, then
/// stalls long enough for a cancellation to land before it reports end
/// of input.
struct Stall {
    prefix: &'static [u8],
    sent: bool,
}

impl io::Read for Stall {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.sent {
            self.sent = true;
            let n = self.prefix.len().min(buf.len());
            buf[..n].copy_from_slice(&self.prefix[..n]);
            return Ok(n);
        }
        thread::sleep(Duration::from_millis(300));
        Ok(0)
    }
}

/// Drain a reader to completion, returning every non-empty buffer.
fn drain(reader: &mut Reader) -> Vec<Buffer> {
    let mut buffers = Vec::new();
    loop {
        let buffer = reader.read().unwrap();
        if buffer.is_empty() {
            return buffers;
        }
        buffers.push(buffer);
    }
}

// ── Scenarios ───────────────────────────────────────────────────

#[test]
fn mixed_document_round_trips_every_kind() {
    let mut reader = Reader::from_string(fixtures::mixed_document());
    let header = reader.header().unwrap();
    assert_eq!(header.version(), "0.6");
    assert_eq!(header.get("generator"), Some("testdata"));

    let buffers = drain(&mut reader);
    reader.close().unwrap();

    let entities: Vec<EntityRef<'_>> = buffers.iter().flat_map(|b| b.entities()).collect();
    assert_eq!(entities.len(), 6);

    let EntityRef::Node(first) = &entities[0] else {
        panic!("expected a node first, got {:?}", entities[0]);
    };
    assert_eq!(first.id().0, 10);
    assert_eq!(first.version(), 1);
    assert_eq!(first.location().x(), 83_600_001);
    assert_eq!(first.location().y(), 490_190_000);

    let EntityRef::Way(way) = &entities[3] else {
        panic!("expected a way fourth, got {:?}", entities[3]);
    };
    assert_eq!(way.id().0, 20);
    let refs: Vec<i64> = way.nodes().iter().map(|n| n.id().0).collect();
    assert_eq!(refs, vec![10, 11, 12, 10]);
    assert_eq!(way.tags().get("landuse"), Some("forest"));

    let EntityRef::Relation(relation) = &entities[4] else {
        panic!("expected a relation fifth, got {:?}", entities[4]);
    };
    let members: Vec<Member> = relation.members().iter().collect();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].kind(), ItemKind::Way);
    assert_eq!(members[0].id().0, 20);

    let EntityRef::Changeset(changeset) = &entities[5] else {
        panic!("expected a changeset last, got {:?}", entities[5]);
    };
    assert_eq!(changeset.id().0, 40);
    assert_eq!(changeset.tags().get("comment"), Some("testdata import"));
}

#[test]
fn trickled_source_is_reassembled() {
    let source = Trickle {
        data: fixtures::mixed_document().as_bytes(),
        at: 0,
        step: 3,
    };
    let mut reader = Reader::new(source);
    let buffers = drain(&mut reader);
    let total: usize = buffers.iter().map(|b| b.entities().count()).sum();
    assert_eq!(total, 6);
    reader.close().unwrap();
}

#[test]
fn buffers_cross_to_the_consuming_thread() {
    let mut reader = Reader::from_string(fixtures::nodes_document());
    let worker = thread::spawn(move || {
        let header = reader.header().unwrap();
        let buffers = drain(&mut reader);
        reader.close().unwrap();
        (header, buffers)
    });
    let (header, buffers) = worker.join().unwrap();
    assert_eq!(header.get("generator"), Some("testdata"));
    let ids: Vec<i64> = buffers.iter().flat_map(|b| b.entities()).map(|e| e.id().0).collect();
    assert_eq!(ids, vec![36_966_060, 36_966_061, 36_966_062]);
}

#[test]
fn flush_threshold_splits_the_stream() {
    let mut config = ReaderConfig::new();
    config.parser.flush_entities = 2;
    let source = io::Cursor::new(fixtures::mixed_document().as_bytes().to_vec());
    let mut reader = Reader::with_config(source, config);
    let buffers = drain(&mut reader);
    assert_eq!(buffers.len(), 3);
    for buffer in &buffers {
        assert_eq!(buffer.entities().count(), 2);
    }
}

#[test]
fn filtered_pipeline_selects_kinds() {
    let mut config = ReaderConfig::new();
    config.filter = EntityFilter::NODES | EntityFilter::CHANGESETS;
    let source = io::Cursor::new(fixtures::mixed_document().as_bytes().to_vec());
    let mut reader = Reader::with_config(source, config);
    let buffers = drain(&mut reader);
    let entities: Vec<EntityRef<'_>> = buffers.iter().flat_map(|b| b.entities()).collect();
    assert_eq!(entities.len(), 4);
    assert!(matches!(entities[3], EntityRef::Changeset(_)));
}

#[test]
fn version_failure_reaches_the_caller() {
    let mut reader = Reader::from_string(fixtures::old_version_document());
    match reader.header().unwrap_err() {
        ReadError::Parse(ParseError::Version { version }) => assert_eq!(version, "0.5"),
        other => panic!("expected a version error, got {other:?}"),
    }
    assert!(reader.read().is_err());
    assert!(reader.close().is_err());
}

#[test]
fn truncated_input_fails_on_both_interfaces() {
    let mut reader = Reader::from_string(fixtures::truncated_document());
    // The document ends inside the first entity tag, so no entity was
    // reached and the failure wins the header cell too.
    let header_error = reader.header().unwrap_err();
    let read_error = reader.read().unwrap_err();
    assert_eq!(header_error, read_error);
    match read_error {
        ReadError::Parse(ParseError::Markup { detail, .. }) => {
            assert_eq!(detail, "unexpected end of document inside markup");
        }
        other => panic!("expected a markup error, got {other:?}"),
    }
}

#[test]
fn early_close_tears_down_cleanly() {
    let mut reader = Reader::from_string(fixtures::mixed_document());
    reader.header().unwrap();
    reader.close().unwrap();
}

#[test]
fn mid_document_close_is_clean() {
    let source = Stall {
        prefix: b"<osm version=\"0.6\" generator=\"testdata\">\n\
            <node id=\"1\" version=\"1\" lon=\"8.35\" lat=\"49.05\"/>\n",
        sent: false,
    };
    let mut reader = Reader::new(source);
    // Header arrival proves the prefix was parsed; the source is now
    // stalled with the root element still open.
    assert_eq!(reader.header().unwrap().version(), "0.6");
    thread::sleep(Duration::from_millis(50));
    reader.close().unwrap();

    // Cancellation keeps the entities that completed and ends the
    // stream with the normal marker instead of a truncation error.
    let buffers = drain(&mut reader);
    let total: usize = buffers.iter().map(|b| b.entities().count()).sum();
    assert_eq!(total, 1);
}
