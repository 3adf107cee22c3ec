//! Navigate, modify and initialize the [`Schema`]

mod error;
mod parsing;

pub use error::SchemaError;

/// An Avro schema, stored as a possibly-cyclic graph of nodes
///
/// In there, references to other nodes are represented as [`SchemaKey`],
/// which allow to index into the [`Schema`].
///
/// It is useful to implement it this way because, due to how referencing via
/// [Names](https://avro.apache.org/docs/current/specification/#names) works in Avro,
/// the most performant representation of an Avro schema is not a tree but a
/// possibly-cyclic general directed graph.
///
/// Node identity is the node's position in the graph storage: two
/// structurally identical nodes at different keys are distinct nodes.
#[derive(Clone, Debug)]
pub struct Schema {
	// First node in the array is considered to be the root
	pub(crate) nodes: Vec<SchemaNode>,
	pub(crate) schema_json: Option<String>,
}

impl Schema {
	/// Initialize a [`Schema`] from a set of nodes.
	///
	/// The first node (index `0`) is the root of the schema.
	pub fn from_nodes(nodes: Vec<SchemaNode>) -> Self {
		Self {
			nodes,
			schema_json: None,
		}
	}

	/// Obtain the underlying graph storage
	///
	/// The first node (index `0`) is the root of the schema.
	///
	/// [`SchemaKey`]s can be converted to indexes of this `Vec`.
	pub fn nodes(&self) -> &[SchemaNode] {
		&self.nodes
	}

	/// Obtain the root of the Schema
	///
	/// It is the first node of the `nodes` `Vec`.
	///
	/// # Panics
	/// If the `nodes` `Vec` is empty.
	pub fn root(&self) -> &SchemaNode {
		self.nodes.first().expect(
			"Schema should have nodes - have you built it \
				from an empty `Vec`?",
		)
	}

	/// Try to get the node at the given [`SchemaKey`]
	///
	/// (or return `None` if the key is invalid)
	///
	/// If you want to panic on invalid keys, use `schema[key]` instead.
	pub fn get(&self, key: SchemaKey) -> Option<&SchemaNode> {
		self.nodes.get(key.idx)
	}

	/// Obtain the JSON this schema was parsed from, if it was parsed from
	/// JSON
	pub fn json(&self) -> Option<&str> {
		self.schema_json.as_deref()
	}
}

/// The location of a node in a [`Schema`]
///
/// This can be used to [`Index`](std::ops::Index) into the [`Schema`].
///
/// (Note that `Index`ing into a `Schema` with an invalid index would cause a
/// panic.)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaKey {
	pub(crate) idx: usize,
}

impl SchemaKey {
	/// Construct a new SchemaKey
	///
	/// This is expected to be an index in the [`nodes`](Schema::nodes) `Vec`
	/// of a [`Schema`].
	pub const fn from_idx(idx: usize) -> Self {
		Self { idx }
	}
	/// Obtain the index in the [`nodes`](Schema::nodes) `Vec` of a
	/// [`Schema`] that this [`SchemaKey`] points to.
	pub const fn idx(self) -> usize {
		self.idx
	}
	/// Construct a new SchemaKey representing the root of the schema
	///
	/// This is equivalent to `SchemaKey::from_idx(0)`, since the root of the
	/// schema is always simply the first element of the `nodes` array.
	pub const fn root() -> Self {
		Self { idx: 0 }
	}
}
impl std::ops::Index<SchemaKey> for Schema {
	type Output = SchemaNode;
	fn index(&self, key: SchemaKey) -> &Self::Output {
		&self.nodes[key.idx]
	}
}
impl std::fmt::Debug for SchemaKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.idx, f)
	}
}

/// A node of an avro schema, stored in a [`Schema`].
///
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/current/specification/).
///
/// In there, references to other nodes are represented as [`SchemaKey`],
/// which allow to index into the [`Schema`].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct SchemaNode {
	/// The underlying regular type of this node
	pub type_: RegularType,
	/// Logical type that the avro type is annotated with, if any
	pub logical_type: Option<LogicalType>,
}

impl SchemaNode {
	/// Build a new [`SchemaNode`] from the given regular type, with no
	/// logical type.
	///
	/// This is equivalent to `type_.into()`.
	pub fn new(type_: RegularType) -> Self {
		type_.into()
	}

	/// Build a new [`SchemaNode`] from the given regular type and logical
	/// type.
	pub fn with_logical_type(type_: RegularType, logical_type: LogicalType) -> Self {
		Self {
			type_,
			logical_type: Some(logical_type),
		}
	}
}

/// A primitive or complex type of an avro schema, stored in a [`SchemaNode`].
#[derive(Clone, Debug)]
pub enum RegularType {
	/// A `null` Avro schema.
	Null,
	/// A `boolean` Avro schema.
	Boolean,
	/// An `int` Avro schema.
	Int,
	/// A `long` Avro schema.
	Long,
	/// A `float` Avro schema.
	Float,
	/// A `double` Avro schema.
	Double,
	/// A `bytes` Avro schema.
	/// `Bytes` represents a sequence of 8-bit unsigned bytes.
	Bytes,
	/// A `string` Avro schema.
	/// `String` represents a unicode character sequence.
	String,
	/// An `array` Avro schema. Avro arrays are required to have the same
	/// type for each element. This variant holds the key of the schema of
	/// the array element type.
	Array(Array),
	/// A `map` Avro schema.
	/// `Map` holds a pointer to the schema of its values, which must all be
	/// the same schema. `Map` keys are assumed to be `string`.
	Map(Map),
	/// A `union` Avro schema.
	Union(Union),
	/// A `record` Avro schema.
	Record(Record),
	/// An `enum` Avro schema.
	Enum(Enum),
	/// A `fixed` Avro schema.
	Fixed(Fixed),
}

impl RegularType {
	/// If the type is a named type, returns the name of the type.
	pub fn name(&self) -> Option<&Name> {
		match self {
			RegularType::Record(record) => Some(&record.name),
			RegularType::Enum(enum_) => Some(&enum_.name),
			RegularType::Fixed(fixed) => Some(&fixed.name),
			_ => None,
		}
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Array {
	/// The key (in the [`Schema`]) of the schema of each item that will be
	/// in the array
	pub items: SchemaKey,
}
impl Array {
	/// `items` is the key (in the [`Schema`]) of the schema of each item
	/// that will be in the array
	pub fn new(items: SchemaKey) -> Self {
		Self { items }
	}
}

/// Component of a [`Schema`]
///
/// An Avro map is a collection of key-value pairs, where the keys are
/// assumed to be strings.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Map {
	/// The key (in the [`Schema`]) of the schema of each value that will be
	/// in the map
	pub values: SchemaKey,
}
impl Map {
	/// `values` is the key (in the [`Schema`]) of the schema of each value
	/// that will be in the map
	pub fn new(values: SchemaKey) -> Self {
		Self { values }
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Union {
	/// The keys (in the [`Schema`]) of the schemas of each variant that this
	/// Avro *union* supports.
	pub variants: Vec<SchemaKey>,
}
impl Union {
	/// `variants` is the keys (in the [`Schema`]) of the schemas of each
	/// variant that this Avro *union* supports.
	pub fn new(variants: Vec<SchemaKey>) -> Self {
		Self { variants }
	}
}

/// Component of a [`Schema`]
///
/// An avro `record` is ~equivalent to a Rust struct.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Record {
	/// The list of fields in this *record* (~= `struct`)
	pub fields: Vec<RecordField>,
	/// The name of the record (including namespace)
	pub name: Name,
}
impl Record {
	/// `name` is the name of the record (including namespace), and `fields`
	/// is the list of fields in this record.
	pub fn new(name: Name, fields: Vec<RecordField>) -> Self {
		Self { fields, name }
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct RecordField {
	/// Name of the field
	pub name: String,
	/// The key (in the [`Schema`]) of the schema of the type of this field
	pub type_: SchemaKey,
}
impl RecordField {
	/// `schema` is the key (in the [`Schema`]) of the schema of the type of
	/// this field.
	pub fn new(name: impl Into<String>, schema: SchemaKey) -> Self {
		Self {
			name: name.into(),
			type_: schema,
		}
	}
}

/// Component of a [`Schema`]
///
/// This is the ~equivalent of a Rust `enum` where none of the variants would
/// hold any inner value. (e.g. `enum Foo { Bar, Baz }`)
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Enum {
	/// All the variants of the enum (e.g. `["Bar", "Baz"]`)
	pub symbols: Vec<String>,
	/// The name of the enum (including namespace)
	pub name: Name,
}
impl Enum {
	/// `name` is the name of the enum (including namespace), and `symbols`
	/// is the list of variants of the enum.
	pub fn new(name: Name, symbols: Vec<String>) -> Self {
		Self { symbols, name }
	}
}

/// Component of a [`Schema`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Fixed {
	/// The size in bytes of the *fixed* type
	pub size: usize,
	/// The name of the *fixed* type, including the namespace
	pub name: Name,
}
impl Fixed {
	/// `name` is name of the *fixed* type, including the namespace, `size`
	/// is the size in bytes of the fixed type
	pub fn new(name: Name, size: usize) -> Self {
		Self { size, name }
	}
}

/// Logical type
///
/// <https://avro.apache.org/docs/current/specification/#logical-types>
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum LogicalType {
	/// Logical type which represents `Decimal` values. The underlying type
	/// is serialized and deserialized as `Bytes` or `Fixed`.
	///
	/// `scale` defaults to 0 and is an integer greater than or equal to 0
	/// and `precision` is an integer greater than 0.
	Decimal(Decimal),
	/// A universally unique identifier, annotating a string.
	Uuid,
	/// Logical type which represents the number of days since the unix
	/// epoch.
	///
	/// Annotates an [`Int`](RegularType::Int).
	Date,
	/// The time of day in number of milliseconds after midnight.
	///
	/// Annotates an [`Int`](RegularType::Int).
	TimeMillis,
	/// The time of day in number of microseconds after midnight.
	///
	/// Annotates a [`Long`](RegularType::Long).
	TimeMicros,
	/// An instant in time represented as the number of milliseconds after
	/// the UNIX epoch.
	///
	/// Annotates a [`Long`](RegularType::Long).
	TimestampMillis,
	/// An instant in time represented as the number of microseconds after
	/// the UNIX epoch.
	///
	/// Annotates a [`Long`](RegularType::Long).
	TimestampMicros,
	/// An amount of time defined by a number of months, days and
	/// milliseconds.
	///
	/// Annotates a [`Fixed`](RegularType::Fixed) of size 12.
	Duration,
	/// A logical type that is not known or not handled in any particular way
	/// by this library.
	///
	/// Readers built for such a schema use its physical type.
	Unknown(UnknownLogicalType),
}

/// Component of a [`Schema`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Decimal {
	/// The scale of the decimal number, which is the number of digits to the
	/// right of the decimal point.
	pub scale: u32,
	/// The precision of the decimal number, which is the number of
	/// significant digits in the number.
	pub precision: usize,
}
impl Decimal {
	/// `scale` is the number of digits to the right of the decimal point,
	/// and `precision` is the number of significant digits in the number.
	pub fn new(scale: u32, precision: usize) -> Self {
		Self { precision, scale }
	}
}

/// Component of a [`Schema`]
///
/// Represents a logical type that is not known or not handled in any
/// particular way by this library.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct UnknownLogicalType {
	/// The name of the logical type, as it appears in the schema JSON
	pub logical_type_name: String,
}
impl UnknownLogicalType {
	/// `logical_type_name` is the name of the logical type, as it appears in
	/// the schema JSON
	pub fn new(logical_type_name: impl Into<String>) -> Self {
		Self {
			logical_type_name: logical_type_name.into(),
		}
	}

	/// Gives the name of the logical type, as it appears in the schema JSON
	pub fn as_str(&self) -> &str {
		&self.logical_type_name
	}
}

impl LogicalType {
	/// The name of the logical type
	///
	/// This is the string that is used in the schema JSON to refer to this
	/// logical type.
	///
	/// For example, the `Decimal` logical type is named `decimal`.
	pub fn as_str(&self) -> &str {
		match self {
			LogicalType::Decimal(_) => "decimal",
			LogicalType::Uuid => "uuid",
			LogicalType::Date => "date",
			LogicalType::TimeMillis => "time-millis",
			LogicalType::TimeMicros => "time-micros",
			LogicalType::TimestampMillis => "timestamp-millis",
			LogicalType::TimestampMicros => "timestamp-micros",
			LogicalType::Duration => "duration",
			LogicalType::Unknown(unknown_logical_type) => &unknown_logical_type.logical_type_name,
		}
	}
}

/// Schema component for named nodes of a [`Schema`]
///
/// This holds both the "name" and the "namespace".
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified_name: String,
	namespace_delimiter_idx: Option<usize>,
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified_name, f)
	}
}

impl Name {
	/// The rightmost component of the fully qualified name
	///
	/// e.g. in `a.b.c` it's `c`
	pub fn name(&self) -> &str {
		match self.namespace_delimiter_idx {
			None => &self.fully_qualified_name,
			Some(delimiter_idx) => &self.fully_qualified_name[delimiter_idx + 1..],
		}
	}

	/// The namespace component of the fully qualified name
	///
	/// e.g. in `a.b.c` it's `a.b`
	pub fn namespace(&self) -> Option<&str> {
		self.namespace_delimiter_idx
			.map(|idx| &self.fully_qualified_name[..idx])
	}

	/// The fully qualified name
	///
	/// e.g. in `a.b.c` it's `a.b.c`
	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified_name
	}

	/// Build a [`Name`] from a fully qualified name
	///
	/// Side note if doing weird stuff: If the only `.` in the fully
	/// qualified name is at the beginning of the string, it will be
	/// stripped, that is, we will parse `namespace: None, name:
	/// "anything_behind_the_dot"`. This is for consistency with the parsing
	/// logic.
	pub fn from_fully_qualified_name(fully_qualified_name: impl Into<String>) -> Self {
		fn non_generic_inner(mut fully_qualified_name: String) -> Name {
			Name {
				namespace_delimiter_idx: match fully_qualified_name.rfind('.') {
					Some(0) => {
						// Let's parse ".x" as {namespace: None, name: "x"}
						fully_qualified_name.remove(0);
						None
					}
					other => other,
				},
				fully_qualified_name,
			}
		}
		non_generic_inner(fully_qualified_name.into())
	}
}

impl From<RegularType> for SchemaNode {
	fn from(regular_type: RegularType) -> Self {
		Self {
			type_: regular_type,
			logical_type: None,
		}
	}
}

macro_rules! impl_froms_for_regular_type {
	($($variant: ident)*) => {
		$(
			impl From<$variant> for RegularType {
				fn from(variant: $variant) -> Self {
					Self::$variant(variant)
				}
			}
			impl From<$variant> for SchemaNode {
				fn from(variant: $variant) -> Self {
					Self {
						type_: RegularType::$variant(variant),
						logical_type: None,
					}
				}
			}
		)*
	};
}
impl_froms_for_regular_type! { Array Map Union Record Enum Fixed }
