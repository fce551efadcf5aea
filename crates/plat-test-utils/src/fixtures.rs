//! Canned XML documents for parser testing.
//!
//! Small, self-contained documents covering the happy path and the
//! standard failure modes:
//!
//! - [`no_data_document`] — well-formed, no entities.
//! - [`nodes_document`] — three nodes from a residential street.
//! - [`mixed_document`] — one of every entity kind.
//! - [`missing_version_document`], [`unknown_version_document`],
//!   [`old_version_document`] — root version rejection cases.
//! - [`empty_document`] — zero bytes of input.
//! - [`truncated_document`] — input that ends inside a tag.

/// A well-formed document with a header and no entities.
pub fn no_data_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="testdata" upload="false"/>
"#
}

/// A root element with no `version` attribute.
pub fn missing_version_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm generator="testdata" upload="false">
</osm>
"#
}

/// A root element carrying a version nothing ever produced.
pub fn unknown_version_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.1" generator="testdata" upload="false">
</osm>
"#
}

/// A root element carrying the long-retired 0.5 format version.
pub fn old_version_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.5" generator="testdata" upload="false">
</osm>
"#
}

/// The degenerate zero-byte input.
pub fn empty_document() -> &'static str {
    ""
}

/// Input that stops in the middle of a node tag.
pub fn truncated_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="testdata" upload="false">
  <node id="36966060" version="1" timestamp="2015-07-01T1"#
}

/// Three consecutive nodes of a residential street in Karlsruhe.
pub fn nodes_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="testdata" upload="false">
  <node id="36966060" version="1" timestamp="2015-07-01T12:30:45Z" lon="8.3628851" lat="49.0189506"/>
  <node id="36966061" version="1" timestamp="2015-07-01T12:30:45Z" lon="8.3629027" lat="49.0193268"/>
  <node id="36966062" version="1" timestamp="2015-07-01T12:30:45Z" lon="8.3629674" lat="49.0199971"/>
</osm>
"#
}

/// One entity of every kind a document can carry: three nodes, a
/// closed way over them, a multipolygon relation, and a changeset.
pub fn mixed_document() -> &'static str {
    r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="testdata" upload="false">
  <node id="10" version="1" timestamp="2015-07-01T12:30:45Z" lon="8.3600001" lat="49.0190000"/>
  <node id="11" version="1" timestamp="2015-07-01T12:30:45Z" lon="8.3600002" lat="49.0190000"/>
  <node id="12" version="1" timestamp="2015-07-01T12:30:45Z" lon="8.3600002" lat="49.0190001"/>
  <way id="20" version="2" timestamp="2015-07-01T12:30:45Z">
    <nd ref="10"/>
    <nd ref="11"/>
    <nd ref="12"/>
    <nd ref="10"/>
    <tag k="landuse" v="forest"/>
  </way>
  <relation id="30" version="1" timestamp="2015-07-01T12:30:45Z">
    <member type="way" ref="20" role="outer"/>
    <tag k="type" v="multipolygon"/>
  </relation>
  <changeset id="40" created_at="2015-07-01T20:15:22Z">
    <tag k="comment" v="testdata import"/>
  </changeset>
</osm>
"#
}
