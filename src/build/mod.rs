//! Build readers by matching (schema, target type) pairs against an ordered
//! list of cases
//!
//! This is where the interesting work happens. A [`ReaderBuilder`] holds the
//! case list; [`ReaderBuilder::build`] resolves the root (schema, target)
//! pair through it and every case recurses back through
//! [`BuildContext::build`] for its sub-readers (array items, record fields,
//! union branches, ...).
//!
//! Case ordering is semantically significant: the logical-type cases
//! (decimal, duration, timestamp) must see a schema before the case for its
//! physical type would, so that a `bytes` schema annotated as `decimal`
//! decodes as a decimal and not as a byte buffer. [`ReaderBuilder::add_case`]
//! consequently prepends.
//!
//! Records may contain themselves (through a union, an array, ...), so the
//! [`BuildContext`] keeps a slot table: the record case registers a slot
//! *before* building its body, and a recursive occurrence of the same
//! (schema, target) pair resolves to an invocation of that slot instead of
//! recursing into the builder forever.

mod cases;
mod error;

pub use {
	cases::{
		ArrayCase, BooleanCase, BytesCase, DecimalCase, DoubleCase, DurationCase, EnumCase,
		FixedCase, FloatCase, IntegerCase, MapCase, NullCase, RecordCase, StringCase,
		TimestampCase, UnionCase,
	},
	error::{BuildError, Rejection, RejectionKind},
};

use crate::{
	de::{DatumReader, DeError, ReadFn},
	schema::{RegularType, Schema, SchemaKey, SchemaNode},
	types::{TypeKey, TypeSpec, TypeStore},
};

use std::{
	collections::HashMap,
	sync::{Arc, OnceLock},
};

/// One strategy for decoding one kind of (schema, target type) pair
///
/// Cases are consulted in order by the [`ReaderBuilder`]; the first one that
/// produces a reader wins. A case that does not apply returns
/// [`CaseOutcome::Rejected`] (cheap, part of normal dispatch); a case that
/// applies but cannot complete construction returns an error, which aborts
/// the whole build.
pub trait BuildCase: Send + Sync {
	/// Short name identifying the case in rejection reports
	fn name(&self) -> &'static str;

	/// Either produce a reader for the pair, or decline and explain why
	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError>;
}

/// What a [`BuildCase`] returns when it does not error
pub enum CaseOutcome {
	/// The case matched and built a reader
	Reader(ReadFn),
	/// The case does not apply to this (schema, target type) pair
	Rejected(Rejection),
}

/// Builds [`DatumReader`]s from (schema, target type) pairs
///
/// Holds the ordered list of [`BuildCase`]s and the decode-time guard
/// defaults that built readers start out with.
pub struct ReaderBuilder {
	cases: Vec<Box<dyn BuildCase>>,
	/// Initial value of [`DatumReader::max_seq_size`] for built readers
	pub max_seq_size: usize,
	/// Initial value of [`DatumReader::allowed_depth`] for built readers
	pub allowed_depth: usize,
}

impl Default for ReaderBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ReaderBuilder {
	/// A builder with the default case list
	pub fn new() -> Self {
		Self::with_cases(cases::default_cases())
	}

	/// A builder with a custom case list, consulted in order
	///
	/// Note that case ordering is semantically significant (logical-type
	/// cases must precede the cases for their physical types).
	pub fn with_cases(cases: Vec<Box<dyn BuildCase>>) -> Self {
		Self {
			cases,
			max_seq_size: 1_000_000_000,
			allowed_depth: 64,
		}
	}

	/// Register an additional case, consulted before the existing ones
	pub fn add_case(&mut self, case: Box<dyn BuildCase>) {
		self.cases.insert(0, case);
	}

	/// The current case list, in consultation order
	pub fn cases(&self) -> &[Box<dyn BuildCase>] {
		&self.cases
	}

	/// Build a reader decoding the schema's datums into the target shape
	///
	/// Sub-readers built along the way are cached for the duration of this
	/// build only; use [`build_with_cache`](Self::build_with_cache) to share
	/// them across builds.
	pub fn build(
		&self,
		types: &mut TypeStore,
		target: TypeKey,
		schema: &Schema,
	) -> Result<DatumReader, BuildError> {
		self.build_with_cache(types, target, schema, &mut ReaderCache::new())
	}

	/// Build a reader, reusing and populating the given cross-build cache
	///
	/// The cache keys sub-readers by `(target type key, schema key)`, so it
	/// must only ever be used with the same [`Schema`] and [`TypeStore`] it
	/// was first populated from.
	pub fn build_with_cache(
		&self,
		types: &mut TypeStore,
		target: TypeKey,
		schema: &Schema,
		cache: &mut ReaderCache,
	) -> Result<DatumReader, BuildError> {
		let mut ctx = BuildContext {
			builder: self,
			schema,
			types,
			synthetic_nodes: Vec::new(),
			synthetic_string: None,
			references: HashMap::new(),
			slots: Vec::new(),
			cache,
		};
		let root = self.build_in(&mut ctx, target, SchemaKey::root())?;
		// Every registered slot must have been assigned a body by now,
		// otherwise invoking the reader would error at decode time
		if ctx.slots.iter().any(|slot| slot.get().is_none()) {
			return Err(BuildError::CycleViolation(
				"a reader slot was registered but never assigned a body",
			));
		}
		Ok(DatumReader {
			root,
			max_seq_size: self.max_seq_size,
			allowed_depth: self.allowed_depth,
		})
	}

	fn build_in(
		&self,
		ctx: &mut BuildContext<'_>,
		target: TypeKey,
		schema: SchemaKey,
	) -> Result<ReadFn, BuildError> {
		// An in-flight record build for the same pair resolves to its slot,
		// breaking the cycle
		if let Some(&slot) = ctx.references.get(&(schema, target)) {
			return Ok(ctx.slot_invocation(slot));
		}
		if let Some(reader) = ctx.cache.get(target, schema) {
			return Ok(reader);
		}
		let mut rejections = Vec::new();
		for case in &self.cases {
			match case.try_build(target, schema, ctx)? {
				CaseOutcome::Reader(reader) => {
					ctx.cache.insert(target, schema, reader.clone());
					return Ok(reader);
				}
				CaseOutcome::Rejected(rejection) => rejections.push(rejection),
			}
		}
		Err(BuildError::NoMatch { rejections })
	}
}

/// State shared across one top-level [`ReaderBuilder::build`]
///
/// Cases recurse through [`build`](Self::build), register slots for
/// cycle-prone readers, and may intern synthetic schema nodes (the `string`
/// schema that map keys are decoded with has no node in the user's schema).
pub struct BuildContext<'a> {
	builder: &'a ReaderBuilder,
	schema: &'a Schema,
	types: &'a mut TypeStore,
	// Keys at or past schema.nodes.len() index into this
	synthetic_nodes: Vec<SchemaNode>,
	synthetic_string: Option<SchemaKey>,
	references: HashMap<(SchemaKey, TypeKey), SlotId>,
	slots: Vec<Arc<OnceLock<ReadFn>>>,
	cache: &'a mut ReaderCache,
}

/// Identifier of a registered reader slot (see [`BuildContext::register_slot`])
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotId(usize);

impl BuildContext<'_> {
	/// Build a sub-reader through the full case dispatch
	pub fn build(&mut self, target: TypeKey, schema: SchemaKey) -> Result<ReadFn, BuildError> {
		let builder = self.builder;
		builder.build_in(self, target, schema)
	}

	/// The schema node behind a key (user schema or synthetic)
	pub fn node(&self, key: SchemaKey) -> Result<&SchemaNode, BuildError> {
		self.schema
			.get(key)
			.or_else(|| self.synthetic_nodes.get(key.idx() - self.schema.nodes().len()))
			.ok_or_else(|| BuildError::unsupported_schema("schema key out of bounds"))
	}

	/// The target spec behind a key
	pub fn spec(&self, key: TypeKey) -> Result<&TypeSpec, BuildError> {
		self.types
			.get(key)
			.ok_or_else(|| BuildError::unsupported_type(format_args!("{key:?}"), "type key out of bounds"))
	}

	/// The target type store (e.g. to intern [`TypeSpec::Any`])
	pub fn types(&mut self) -> &mut TypeStore {
		self.types
	}

	/// A synthetic `string` schema node, interned on first use
	///
	/// This is what map keys are decoded against: the map schema has no
	/// schema node for its keys, but the key reader is built through the
	/// full dispatch like any other.
	pub fn string_schema(&mut self) -> SchemaKey {
		match self.synthetic_string {
			Some(key) => key,
			None => {
				let key = SchemaKey::from_idx(self.schema.nodes().len() + self.synthetic_nodes.len());
				self.synthetic_nodes.push(RegularType::String.into());
				self.synthetic_string = Some(key);
				key
			}
		}
	}

	/// Register a reader slot for the given pair, before building its body
	///
	/// Returns the slot id (to [`fill`](Self::fill_slot) once the body is
	/// built) and the reader expression that invokes the slot. Until the
	/// body is built, any recursive occurrence of the same pair resolves to
	/// that invocation, which is what makes self-referential records
	/// buildable in finite time.
	pub fn register_slot(
		&mut self,
		schema: SchemaKey,
		target: TypeKey,
	) -> Result<(SlotId, ReadFn), BuildError> {
		let slot = SlotId(self.slots.len());
		self.slots.push(Arc::new(OnceLock::new()));
		if self.references.insert((schema, target), slot).is_some() {
			return Err(BuildError::CycleViolation(
				"a reader slot for this (schema, target type) pair is already registered",
			));
		}
		Ok((slot, self.slot_invocation(slot)))
	}

	/// Assign the body of a slot registered with
	/// [`register_slot`](Self::register_slot)
	pub fn fill_slot(&mut self, slot: SlotId, reader: ReadFn) -> Result<(), BuildError> {
		self.slots[slot.0].set(reader).map_err(|_| {
			BuildError::CycleViolation("a reader slot was assigned a body twice")
		})
	}

	fn slot_invocation(&self, slot: SlotId) -> ReadFn {
		let cell = Arc::clone(&self.slots[slot.0]);
		Arc::new(move |state| match cell.get() {
			Some(read) => read(state),
			None => Err(DeError::new(
				"Reader slot invoked before its body was assigned",
			)),
		})
	}
}

/// A cross-build reader cache (see [`ReaderBuilder::build_with_cache`])
///
/// Maps `(target type key, schema key)` pairs to their built reader, so
/// repeated builds against the same [`Schema`] and
/// [`TypeStore`](crate::types::TypeStore) do not re-run case dispatch. Only
/// meaningful when reused with the schema and store it was populated from.
#[derive(Default)]
pub struct ReaderCache {
	readers: HashMap<(TypeKey, SchemaKey), ReadFn>,
}

impl ReaderCache {
	/// An empty cache
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of cached readers
	pub fn len(&self) -> usize {
		self.readers.len()
	}

	/// Whether the cache is empty
	pub fn is_empty(&self) -> bool {
		self.readers.is_empty()
	}

	fn get(&self, target: TypeKey, schema: SchemaKey) -> Option<ReadFn> {
		self.readers.get(&(target, schema)).cloned()
	}

	fn insert(&mut self, target: TypeKey, schema: SchemaKey, reader: ReadFn) {
		self.readers.insert((target, schema), reader);
	}
}
