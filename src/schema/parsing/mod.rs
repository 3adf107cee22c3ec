mod raw;

use super::*;

use std::collections::HashMap;

const LATE_NAME_LOOKUP_REMAP_BIT: usize = 1usize << (usize::BITS - 1);

struct SchemaConstructionState<'a> {
	nodes: Vec<SchemaNode>,
	names: HashMap<NameKey<'a>, usize>,
	unresolved_names: Vec<NameKey<'a>>,
}

impl std::str::FromStr for Schema {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut state = SchemaConstructionState {
			nodes: Vec::new(),
			names: HashMap::new(),
			unresolved_names: Vec::new(),
		};

		let raw_schema: raw::SchemaNode =
			serde_json::from_str(s).map_err(SchemaError::serde_json)?;

		state.register_node(&raw_schema, None)?;

		// Support for unordered name definitions
		if !state.unresolved_names.is_empty() {
			let resolved_names: Vec<SchemaKey> = state
				.unresolved_names
				.into_iter()
				.map(|name| {
					state
						.names
						.get(&name)
						.ok_or(SchemaError::msg(format_args!(
							"The Schema contains an unknown reference: {}",
							name,
						)))
						.map(|&idx| SchemaKey { idx })
				})
				.collect::<Result<_, _>>()?;
			let fix_key = |key: &mut SchemaKey| {
				if key.idx & LATE_NAME_LOOKUP_REMAP_BIT != 0 {
					*key = resolved_names[key.idx ^ LATE_NAME_LOOKUP_REMAP_BIT];
				}
			};
			for schema_node in &mut state.nodes {
				match &mut schema_node.type_ {
					RegularType::Array(array) => fix_key(&mut array.items),
					RegularType::Map(map) => fix_key(&mut map.values),
					RegularType::Union(union) => union.variants.iter_mut().for_each(fix_key),
					RegularType::Record(record) => {
						record.fields.iter_mut().for_each(|f| fix_key(&mut f.type_))
					}
					RegularType::Null
					| RegularType::Boolean
					| RegularType::Int
					| RegularType::Long
					| RegularType::Float
					| RegularType::Double
					| RegularType::Bytes
					| RegularType::String
					| RegularType::Enum(_)
					| RegularType::Fixed(_) => {}
				}
			}
		}

		Ok(Self {
			nodes: state.nodes,
			schema_json: Some(
				String::from_utf8({
					// Sanitize & minify json, preserving all keys.
					let mut serializer = serde_json::Serializer::new(Vec::new());
					serde_transcode::transcode(
						&mut serde_json::Deserializer::from_str(s),
						&mut serializer,
					)
					.map_err(SchemaError::serde_json)?;
					serializer.into_inner()
				})
				.map_err(|e| {
					SchemaError::msg(format_args!(
						"serde_json should not emit invalid UTF-8 but got {e}"
					))
				})?,
			),
		})
	}
}

impl<'a> SchemaConstructionState<'a> {
	fn register_node(
		&mut self,
		raw_schema: &'a raw::SchemaNode<'a>,
		enclosing_namespace: Option<&'a str>,
	) -> Result<SchemaKey, SchemaError> {
		Ok(match *raw_schema {
			raw::SchemaNode::Type(type_) => {
				let idx = self.nodes.len();
				self.nodes.push(SchemaNode::new(match type_ {
					raw::Type::Null => RegularType::Null,
					raw::Type::Boolean => RegularType::Boolean,
					raw::Type::Int => RegularType::Int,
					raw::Type::Long => RegularType::Long,
					raw::Type::Float => RegularType::Float,
					raw::Type::Double => RegularType::Double,
					raw::Type::Bytes => RegularType::Bytes,
					raw::Type::String => RegularType::String,
					complex_type @ (raw::Type::Array
					| raw::Type::Map
					| raw::Type::Record
					| raw::Type::Enum
					| raw::Type::Fixed) => {
						return Err(SchemaError::msg(format_args!(
							"Expected primitive type name, but got {:?} as type which is a complex \
								type, so should be in an object.",
							complex_type
						)))
					}
				}));
				SchemaKey { idx }
			}
			raw::SchemaNode::Object(ref object) => {
				let idx = self.nodes.len();
				let object = &**object;
				// Register name->node idx to the name HashMap
				let name_key = if let Some(ref name) = object.name {
					let name: &str = &name.0;
					let name_key = if let Some((namespace, name)) = name.rsplit_once('.') {
						NameKey {
							namespace: Some(namespace).filter(|&s| !s.is_empty()),
							name,
						}
					} else {
						NameKey {
							namespace: match object.namespace {
								// An explicit empty string as namespace
								// "indicates the null namespace"
								Some(ref namespace) => {
									Some(&*namespace.0).filter(|&s| !s.is_empty())
								}
								None => enclosing_namespace,
							},
							name,
						}
					};
					if self.names.insert(name_key, idx).is_some() {
						return Err(SchemaError::msg(format_args!(
							"The Schema contains duplicate definitions for {}",
							name_key
						)));
					}
					Some(name_key)
				} else {
					None
				};
				let name = |type_: raw::Type| match name_key {
					None => Err(SchemaError::msg(format_args!(
						"Missing name for type {:?}",
						type_
					))),
					Some(name_key) => Ok((name_key.name(), name_key)),
				};

				macro_rules! field {
					($type_: ident $name: ident) => {
						match &object.$name {
							Some(v) => v,
							_ => {
								return Err(SchemaError::msg(format_args!(
									concat!("Missing field `", stringify!($name), "` on type {:?}",),
									$type_
								)));
							}
						}
					};
				}

				let logical_type = match object.logical_type {
					None => None,
					Some(ref logical_type) => Some(match &*logical_type.0 {
						"decimal" => LogicalType::Decimal(Decimal {
							precision: object.precision.ok_or(SchemaError::new(
								"Missing field `precision` on logical type decimal",
							))?,
							scale: object.scale.ok_or(SchemaError::new(
								"Missing field `scale` on logical type decimal",
							))?,
						}),
						"uuid" => LogicalType::Uuid,
						"date" => LogicalType::Date,
						"time-millis" => LogicalType::TimeMillis,
						"time-micros" => LogicalType::TimeMicros,
						"timestamp-millis" => LogicalType::TimestampMillis,
						"timestamp-micros" => LogicalType::TimestampMicros,
						"duration" => LogicalType::Duration,
						unknown => LogicalType::Unknown(UnknownLogicalType::new(unknown)),
					}),
				};

				self.nodes.push(SchemaNode::new(RegularType::Null)); // Reserve the spot for us
				let regular_type = match object.type_ {
					raw::SchemaNode::Type(t @ raw::Type::Array) => RegularType::Array(Array {
						items: self.register_node(field!(t items), enclosing_namespace)?,
					}),
					raw::SchemaNode::Type(t @ raw::Type::Map) => RegularType::Map(Map {
						values: self.register_node(field!(t values), enclosing_namespace)?,
					}),
					raw::SchemaNode::Type(t @ raw::Type::Enum) => RegularType::Enum(Enum {
						name: name(t)?.0,
						symbols: field!(t symbols).iter().map(|e| (*e.0).to_owned()).collect(),
					}),
					raw::SchemaNode::Type(t @ raw::Type::Fixed) => RegularType::Fixed(Fixed {
						name: name(t)?.0,
						size: *field!(t size),
					}),
					raw::SchemaNode::Type(t @ raw::Type::Record) => {
						let (name, name_key) = name(t)?;
						RegularType::Record(Record {
							fields: field!(t fields)
								.iter()
								.map(|field| {
									Ok(RecordField {
										name: (*field.name.0).to_owned(),
										type_: self
											.register_node(&field.type_, name_key.namespace)?,
									})
								})
								.collect::<Result<_, SchemaError>>()?,
							name,
						})
					}
					raw::SchemaNode::Type(raw::Type::Null) => RegularType::Null,
					raw::SchemaNode::Type(raw::Type::Boolean) => RegularType::Boolean,
					raw::SchemaNode::Type(raw::Type::Int) => RegularType::Int,
					raw::SchemaNode::Type(raw::Type::Long) => RegularType::Long,
					raw::SchemaNode::Type(raw::Type::Float) => RegularType::Float,
					raw::SchemaNode::Type(raw::Type::Double) => RegularType::Double,
					raw::SchemaNode::Type(raw::Type::Bytes) => RegularType::Bytes,
					raw::SchemaNode::Type(raw::Type::String) => RegularType::String,
					ref inner_type @ (raw::SchemaNode::Ref(_)
					| raw::SchemaNode::Object(_)
					| raw::SchemaNode::Union(_)) => {
						// We have to allow {"type": {"type": "string"}}
						// (an object with an inner type and nothing else is a
						// valid representation)
						// However in that case we would ignore all keys that
						// are set at our current level, so we check for this
						match object {
							&raw::SchemaNodeObject {
								type_: _,
								logical_type: None,
								name: _,
								namespace: _,
								fields: None,
								symbols: None,
								items: None,
								values: None,
								size: None,
								precision: None,
								scale: None,
							} => {
								self.nodes.pop().expect("We have just pushed");
								return self.register_node(
									inner_type,
									name_key
										.as_ref()
										.and_then(|n| n.namespace)
										.or(enclosing_namespace),
								);
							}
							_ if object.logical_type.is_some() => {
								return Err(SchemaError::new(
									"A logicalType annotation should apply to a type name, \
										not to a nested type object",
								))
							}
							_ => {
								return Err(SchemaError::new(
									"Got unnecessarily-nested type, but local object \
										properties are set - those would be ignored",
								))
							}
						}
					}
				};
				self.nodes[idx] = SchemaNode {
					type_: regular_type,
					logical_type,
				};
				SchemaKey { idx }
			}
			raw::SchemaNode::Union(ref union_schemas) => {
				let idx = self.nodes.len();
				self.nodes.push(SchemaNode::new(RegularType::Null)); // Reserve the spot for us
				let new_node = SchemaNode::new(RegularType::Union(Union {
					variants: union_schemas
						.iter()
						.map(|schema| self.register_node(schema, enclosing_namespace))
						.collect::<Result<_, _>>()?,
				}));
				self.nodes[idx] = new_node;
				SchemaKey { idx }
			}
			raw::SchemaNode::Ref(ref reference) => {
				// This is supposed to be the fullname of a previous named
				// type. The Avro specification wants the definition to come
				// first, but we tolerate unordered definitions.
				let name_key = if let Some((namespace, name)) = reference.rsplit_once('.') {
					NameKey {
						namespace: Some(namespace).filter(|&s| !s.is_empty()),
						name,
					}
				} else {
					NameKey {
						namespace: enclosing_namespace,
						name: reference,
					}
				};
				match self.names.get(&name_key) {
					Some(&idx) => SchemaKey { idx },
					None => {
						let idx = self.unresolved_names.len();
						self.unresolved_names.push(name_key);
						SchemaKey {
							idx: idx | LATE_NAME_LOOKUP_REMAP_BIT,
						}
					}
				}
			}
		})
	}
}

#[derive(PartialEq, Eq, Hash, Clone, Copy)]
struct NameKey<'a> {
	namespace: Option<&'a str>,
	name: &'a str,
}
impl NameKey<'_> {
	fn name(&self) -> Name {
		match self.namespace {
			None => Name::from_fully_qualified_name(self.name),
			Some(namespace) => Name::from_fully_qualified_name(format!("{}.{}", namespace, self.name)),
		}
	}
}
impl std::fmt::Display for NameKey<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.namespace {
			None => f.write_str(self.name),
			Some(namespace) => write!(f, "{}.{}", namespace, self.name),
		}
	}
}
