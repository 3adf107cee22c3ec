//! # Getting started
//!
//! This crate builds reusable readers for the binary Avro datum encoding.
//! Unlike a serde-based deserializer, the target shape is described at
//! runtime (a [`types::TypeSpec`] graph, playing the role reflection plays
//! on platforms that have it); the builder matches (schema, target shape)
//! pairs against an ordered list of cases and composes a closure tree that
//! decodes a byte stream in one straight descent.
//!
//! ```
//! let schema: avro_bind::Schema = r#"
//! {
//! 	"type": "record",
//! 	"name": "test.User",
//! 	"fields": [
//! 		{ "name": "name", "type": "string" },
//! 		{ "name": "id", "type": "long" }
//! 	]
//! }
//! "#
//! .parse()
//! .expect("Failed to parse schema");
//!
//! use avro_bind::types::*;
//!
//! let mut types = TypeStore::new();
//! let name = types.insert(TypeSpec::Text);
//! let id = types.insert(TypeSpec::Integer {
//! 	width: IntWidth::W64,
//! 	signed: true,
//! });
//! let user = types.insert(RecordSpec::new(
//! 	"User",
//! 	vec![FieldSpec::new("name", name), FieldSpec::new("id", id)],
//! ));
//!
//! let reader = avro_bind::build_reader(&mut types, user, &schema).expect("Failed to build");
//!
//! // "foo", 4
//! let datum = &[6, 102, 111, 111, 8];
//! let value = reader.read_slice(datum).expect("Failed to read");
//! let record = value.as_record().unwrap();
//! assert_eq!(record.get("name").unwrap().as_str(), Some("foo"));
//! assert_eq!(record.get("id").unwrap().as_i64(), Some(4));
//! ```
//!
//! # Schema evolution towards the target
//!
//! The reader tolerates schema fields the target shape does not have: the
//! bytes are still consumed (through a surrogate target), the value is
//! discarded, and the rest of the record decodes as if the field were
//! understood. Symmetrically, record targets may be instantiated through a
//! constructor whose extra parameters have defaults.
//!
//! # Customization
//!
//! The case list is open: [`build::ReaderBuilder::add_case`] registers a
//! [`build::BuildCase`] of your own ahead of the built-in ones, and the
//! union case accepts a branch-target selection hook
//! ([`build::UnionCase::with_select_type`]) for polymorphic mappings. Case
//! ordering is semantically significant: the logical-type cases (decimal,
//! duration, timestamp) run before the cases for their physical types.
//!
//! # Decode-time guards
//!
//! Built readers are hardened against malformed data the way a streaming
//! deserializer has to be: [`DatumReader::max_seq_size`] bounds the total
//! number of sequence items, [`DatumReader::allowed_depth`] bounds nesting
//! (readers for cyclic schemas would otherwise be a stack-overflow vector),
//! and [`de::read::ReaderRead::max_alloc_size`] bounds single-field
//! allocations when decoding from an `impl BufRead`.

pub mod build;
mod convert;
pub mod de;
pub mod schema;
pub mod types;
mod value;

pub use {
	build::{BuildError, ReaderBuilder},
	de::{DatumReader, DeError},
	schema::Schema,
	value::{EnumValue, StructValue, Value},
};

/// Build a reader decoding the schema's datums into the given target shape
///
/// This is the one-stop entry point; it is equivalent to
/// [`ReaderBuilder::new().build(..)`](build::ReaderBuilder::build). Use a
/// [`ReaderBuilder`] directly to customize cases, share a cross-build
/// reader cache, or tune the decode-time guards.
pub fn build_reader(
	types: &mut types::TypeStore,
	target: types::TypeKey,
	schema: &Schema,
) -> Result<DatumReader, BuildError> {
	ReaderBuilder::new().build(types, target, schema)
}
