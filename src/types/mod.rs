//! Describe the target shapes that readers decode into
//!
//! A [`TypeSpec`] plays the role reflection plays in runtime-reflective
//! implementations of this mapping: it tells the reader builder what the
//! decoded value should look like (integer widths, collection flavors,
//! record constructors and members, ...). Specs are stored in a
//! [`TypeStore`] and reference each other through [`TypeKey`]s, so that
//! self-referential target shapes (e.g. linked records) can be described.

use crate::Value;

/// Storage for [`TypeSpec`]s, allowing self-referential target shapes
///
/// In there, references to other specs are represented as [`TypeKey`], which
/// allow to index into the [`TypeStore`].
#[derive(Debug, Default)]
pub struct TypeStore {
	nodes: Vec<TypeSpec>,
	any: Option<TypeKey>,
}

impl TypeStore {
	/// Construct an empty `TypeStore`
	pub fn new() -> Self {
		Self::default()
	}

	/// Initialize a `TypeStore` from a set of specs
	///
	/// The spec at index `i` gets the key `TypeKey::from_idx(i)`, which is
	/// how self-referential target shapes (e.g. a record that optionally
	/// contains itself) are described: compute the keys up front, then build
	/// the nodes referencing them.
	pub fn from_nodes(nodes: Vec<TypeSpec>) -> Self {
		Self { nodes, any: None }
	}

	/// Register a spec, obtaining the [`TypeKey`] that refers to it
	pub fn insert(&mut self, spec: impl Into<TypeSpec>) -> TypeKey {
		let idx = self.nodes.len();
		self.nodes.push(spec.into());
		TypeKey { idx }
	}

	/// Try to get the spec at the given [`TypeKey`]
	///
	/// (or return `None` if the key is invalid)
	///
	/// If you want to panic on invalid keys, use `store[key]` instead.
	pub fn get(&self, key: TypeKey) -> Option<&TypeSpec> {
		self.nodes.get(key.idx)
	}

	/// Obtain the underlying spec storage
	pub fn nodes(&self) -> &[TypeSpec] {
		&self.nodes
	}

	/// The interned key of the [`TypeSpec::Any`] spec
	///
	/// There is a single `Any` node per store. It is registered on first use.
	pub fn any(&mut self) -> TypeKey {
		match self.any {
			Some(key) => key,
			None => {
				let key = self.insert(TypeSpec::Any);
				self.any = Some(key);
				key
			}
		}
	}
}

impl std::ops::Index<TypeKey> for TypeStore {
	type Output = TypeSpec;
	fn index(&self, key: TypeKey) -> &Self::Output {
		&self.nodes[key.idx]
	}
}

/// The location of a spec in a [`TypeStore`]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey {
	pub(crate) idx: usize,
}

impl TypeKey {
	/// Construct a new TypeKey
	///
	/// This is expected to be an index in the [`nodes`](TypeStore::nodes)
	/// `Vec` of a [`TypeStore`].
	pub const fn from_idx(idx: usize) -> Self {
		Self { idx }
	}
	/// Obtain the index in the [`nodes`](TypeStore::nodes) `Vec` of a
	/// [`TypeStore`] that this [`TypeKey`] points to.
	pub const fn idx(self) -> usize {
		self.idx
	}
}

impl std::fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.idx, f)
	}
}

/// Description of a target shape, stored in a [`TypeStore`]
///
/// References to other specs are represented as [`TypeKey`], which allow to
/// index into the [`TypeStore`].
#[derive(Clone, Debug)]
pub enum TypeSpec {
	/// The decoded value is a `bool`
	Boolean,
	/// The decoded value is an integer of the given width and signedness
	///
	/// Conversions from the on-wire 64-bit value are checked: values that do
	/// not fit error at read time.
	Integer {
		/// Width in bits of the target integer
		width: IntWidth,
		/// Whether the target integer is signed
		signed: bool,
	},
	/// The decoded value is a binary floating-point number
	Floating {
		/// Width in bits of the target float
		width: FloatWidth,
	},
	/// The decoded value is a byte buffer (`Vec<u8>`)
	ByteArray,
	/// The decoded value is a `String`
	Text,
	/// The decoded value is a [`uuid::Uuid`]
	///
	/// Decodes from a `string` schema (hyphenated representation) or from a
	/// 16-byte `bytes`/`fixed` schema.
	Uuid,
	/// The decoded value is a [`url::Url`], decoded from a `string` schema
	Url,
	/// The decoded value is a [`rust_decimal::Decimal`]
	///
	/// Decodes from a `bytes`/`fixed` schema carrying the `decimal` logical
	/// type.
	Decimal,
	/// The decoded value is a [`time::Duration`]
	///
	/// Decodes from a `fixed(12)` schema carrying the `duration` logical
	/// type, or from an ISO-8601 duration string.
	Duration,
	/// The decoded value is a [`time::OffsetDateTime`]
	///
	/// Decodes from a `long` schema carrying a timestamp logical type, or
	/// from an RFC 3339 string.
	Timestamp,
	/// The decoded value is one of a fixed set of symbols
	Enum(EnumSpec),
	/// The decoded value is a sequence of items
	Sequence {
		/// Spec of each item of the sequence
		item: TypeKey,
		/// Which concrete sequence representation to build
		kind: SequenceKind,
	},
	/// The decoded value is a mapping from string-like keys to values
	Mapping {
		/// Spec of the keys (must decode from `string`: [`TypeSpec::Text`],
		/// [`TypeSpec::Uuid`], [`TypeSpec::Url`] or [`TypeSpec::Any`])
		key: TypeKey,
		/// Spec of the values
		value: TypeKey,
		/// Which concrete mapping representation to build
		kind: MapKind,
	},
	/// The decoded value is a named record with fields
	Record(RecordSpec),
	/// The decoded value may be absent ([`Value::Null`])
	///
	/// This is the branch-selection pivot for unions with a `null` variant.
	Optional(TypeKey),
	/// Accept whatever the schema naturally decodes to
	///
	/// Under `Any`, enums decode to their index as an integer, records
	/// decode and discard their fields, and arrays/maps keep their
	/// sequence/mapping shape. This is also what the record case reads
	/// schema fields with when the target record has no matching member, so
	/// that the byte stream advances correctly.
	Any,
}

/// Width in bits of a [`TypeSpec::Integer`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntWidth {
	/// 8-bit integer
	W8,
	/// 16-bit integer
	W16,
	/// 32-bit integer
	W32,
	/// 64-bit integer
	W64,
}

/// Width in bits of a [`TypeSpec::Floating`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FloatWidth {
	/// `f32`
	W32,
	/// `f64`
	W64,
}

/// Which concrete sequence representation a [`TypeSpec::Sequence`] builds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SequenceKind {
	/// Contiguous [`Vec`] ([`Value::Array`])
	List,
	/// [`VecDeque`](std::collections::VecDeque) ([`Value::Deque`]),
	/// bulk-converted from the contiguous intermediate
	Deque,
}

/// Which concrete mapping representation a [`TypeSpec::Mapping`] builds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapKind {
	/// [`HashMap`](std::collections::HashMap) ([`Value::Map`])
	Hashed,
	/// [`BTreeMap`](std::collections::BTreeMap) ([`Value::SortedMap`]),
	/// ordered by key
	Sorted,
}

/// Component of a [`TypeSpec::Enum`]
#[derive(Clone, Debug)]
pub struct EnumSpec {
	/// Name of the target enum type
	pub name: String,
	/// All symbols of the target enum
	pub symbols: Vec<EnumSymbol>,
}
impl EnumSpec {
	/// `name` is the name of the target enum type, `symbols` are its
	/// variants
	pub fn new(name: impl Into<String>, symbols: Vec<EnumSymbol>) -> Self {
		Self {
			name: name.into(),
			symbols,
		}
	}
}

/// Component of an [`EnumSpec`]
#[derive(Clone, Debug)]
pub struct EnumSymbol {
	/// Name of the symbol, matched against schema symbols
	pub name: MatchName,
	/// Value carried by the decoded [`Value::Enum`]
	pub value: i64,
}
impl EnumSymbol {
	/// `name` is matched against schema symbols, `value` is carried by the
	/// decoded value
	pub fn new(name: impl Into<MatchName>, value: i64) -> Self {
		Self {
			name: name.into(),
			value,
		}
	}
}

/// Component of a [`TypeSpec::Record`]
#[derive(Clone, Debug)]
pub struct RecordSpec {
	/// Name of the target record type
	pub name: String,
	/// Assignable members of the target record
	pub fields: Vec<FieldSpec>,
	/// Constructors of the target record, in order of preference
	///
	/// A constructor is used over member assignment if every schema field
	/// has a name-matched parameter and all other parameters are optional or
	/// have defaults.
	pub constructors: Vec<Constructor>,
}
impl RecordSpec {
	/// A record spec with assignable members and no constructors
	pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
		Self {
			name: name.into(),
			fields,
			constructors: Vec::new(),
		}
	}

	/// Add a constructor, keeping declaration order as preference order
	pub fn with_constructor(mut self, constructor: Constructor) -> Self {
		self.constructors.push(constructor);
		self
	}
}

/// Component of a [`RecordSpec`]: an assignable member
#[derive(Clone, Debug)]
pub struct FieldSpec {
	/// Name of the member, matched against schema field names
	pub name: MatchName,
	/// Spec of the member
	pub type_: TypeKey,
}
impl FieldSpec {
	/// `name` is matched against schema field names
	pub fn new(name: impl Into<MatchName>, type_: TypeKey) -> Self {
		Self {
			name: name.into(),
			type_,
		}
	}
}

/// Component of a [`RecordSpec`]: one way to instantiate the record
#[derive(Clone, Debug)]
pub struct Constructor {
	/// Parameters, in the order the instantiated record's fields will have
	pub parameters: Vec<Parameter>,
}
impl Constructor {
	/// `parameters` in the order the instantiated record's fields will have
	pub fn new(parameters: Vec<Parameter>) -> Self {
		Self { parameters }
	}
}

/// Component of a [`Constructor`]
#[derive(Clone, Debug)]
pub struct Parameter {
	/// Name of the parameter, matched against schema field names
	pub name: MatchName,
	/// Spec of the parameter
	pub type_: TypeKey,
	/// Value used when no schema field matches this parameter
	pub default: Option<Value>,
	/// Whether this parameter may be left out entirely
	///
	/// An optional parameter with no [`default`](Parameter::default) is
	/// filled with [`Value::Null`] when no schema field matches.
	pub optional: bool,
}
impl Parameter {
	/// A required parameter
	pub fn new(name: impl Into<MatchName>, type_: TypeKey) -> Self {
		Self {
			name: name.into(),
			type_,
			default: None,
			optional: false,
		}
	}

	/// Provide a default, making the parameter satisfiable without a
	/// matching schema field
	pub fn with_default(mut self, default: Value) -> Self {
		self.default = Some(default);
		self
	}

	/// Mark the parameter optional
	pub fn optional(mut self) -> Self {
		self.optional = true;
		self
	}
}

impl From<EnumSpec> for TypeSpec {
	fn from(spec: EnumSpec) -> Self {
		Self::Enum(spec)
	}
}
impl From<RecordSpec> for TypeSpec {
	fn from(spec: RecordSpec) -> Self {
		Self::Record(spec)
	}
}

/// A name that knows how to match itself against schema-side names
///
/// Matching is lenient: besides the exact spelling, a `MatchName` matches
/// ASCII-case-insensitively ignoring `_` and `-` separators (so a
/// `client_id` member matches a `clientId` schema field), as well as any of
/// its registered aliases (exactly).
#[derive(Clone, Debug)]
pub struct MatchName {
	value: String,
	aliases: Vec<String>,
}

impl MatchName {
	/// Build a `MatchName` from the canonical spelling
	pub fn new(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			aliases: Vec::new(),
		}
	}

	/// Register an alias, matched exactly
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.aliases.push(alias.into());
		self
	}

	/// The canonical spelling
	pub fn as_str(&self) -> &str {
		&self.value
	}

	/// Whether this name matches the given schema-side name
	pub fn matches(&self, name: &str) -> bool {
		self.value == name
			|| lenient_eq(&self.value, name)
			|| self.aliases.iter().any(|alias| alias == name)
	}
}

impl From<String> for MatchName {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl From<&str> for MatchName {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl std::fmt::Display for MatchName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(&self.value, f)
	}
}

/// ASCII-case-insensitive comparison ignoring `_` and `-`
fn lenient_eq(a: &str, b: &str) -> bool {
	let significant = |c: &char| !matches!(c, '_' | '-');
	let mut a = a.chars().filter(significant);
	let mut b = b.chars().filter(significant);
	loop {
		match (a.next(), b.next()) {
			(None, None) => return true,
			(Some(ca), Some(cb)) if ca.eq_ignore_ascii_case(&cb) => {}
			_ => return false,
		}
	}
}
