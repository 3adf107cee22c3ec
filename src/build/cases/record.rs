use super::*;

use crate::{
	types::RecordSpec,
	value::StructValue,
};

/// Decodes a `record` schema into a record target, reading fields in schema
/// order
///
/// This is the case the build context's slot table exists for: the slot for
/// the (schema, target) pair is registered *before* the field readers are
/// built, so a record that contains itself (through a union, an array, ...)
/// resolves its recursive occurrence to the slot instead of recursing into
/// the builder forever.
///
/// Instantiation prefers a constructor whose parameters cover every schema
/// field (reads are still emitted in schema-field order and bound to
/// intermediate values first, since the wire format dictates read order);
/// otherwise the target starts from its members' zero values and matched
/// members are assigned one by one. A schema field with no matching member
/// is read against the surrogate target and discarded, so that the byte
/// stream advances exactly as if the field were understood.
pub struct RecordCase;

impl BuildCase for RecordCase {
	fn name(&self) -> &'static str {
		"record"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let schema_fields = match ctx.node(schema)?.type_ {
			RegularType::Record(ref record) => record
				.fields
				.iter()
				.map(|field| (field.name.clone(), field.type_))
				.collect::<Vec<(String, SchemaKey)>>(),
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a record schema, got {}", schema_kind(other)),
				)))
			}
		};
		let effective = convert::unwrap_optional(ctx.types(), target);
		let record_spec = match *ctx.spec(effective)? {
			TypeSpec::Record(ref spec) => Some(spec.clone()),
			TypeSpec::Any => None,
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected a record target, got {}", spec_kind(other)),
				)))
			}
		};

		// Must happen before building any field reader
		let (slot, invocation) = ctx.register_slot(schema, target)?;

		let body: ReadFn = match record_spec {
			None => build_discarding(ctx, &schema_fields)?,
			Some(spec) => match select_constructor(&spec, &schema_fields) {
				Some((constructor, param_for_field)) => build_with_constructor(
					ctx,
					&spec,
					constructor,
					param_for_field,
					&schema_fields,
				)?,
				None => build_with_members(ctx, &spec, &schema_fields)?,
			},
		};
		ctx.fill_slot(slot, body)?;
		Ok(CaseOutcome::Reader(invocation))
	}
}

/// The surrogate body: read every field against the surrogate target and
/// yield nothing
fn build_discarding(
	ctx: &mut BuildContext<'_>,
	schema_fields: &[(String, SchemaKey)],
) -> Result<ReadFn, BuildError> {
	let mut field_reads = Vec::with_capacity(schema_fields.len());
	for &(_, field_schema) in schema_fields {
		let any = ctx.types().any();
		field_reads.push(ctx.build(any, field_schema)?);
	}
	Ok(Arc::new(move |state| {
		let mut state = state.nested()?;
		for read in &field_reads {
			read(&mut state)?;
		}
		Ok(Value::Null)
	}))
}

/// Pick the first constructor where every schema field has its own
/// name-matched parameter and every unmatched parameter is satisfiable
///
/// Returns the constructor index and, for each schema field in order, the
/// index of its parameter.
fn select_constructor(
	spec: &RecordSpec,
	schema_fields: &[(String, SchemaKey)],
) -> Option<(usize, Vec<usize>)> {
	'constructors: for (constructor_idx, constructor) in spec.constructors.iter().enumerate() {
		let mut param_for_field = Vec::with_capacity(schema_fields.len());
		let mut used = vec![false; constructor.parameters.len()];
		for (field_name, _) in schema_fields {
			match constructor
				.parameters
				.iter()
				.position(|parameter| parameter.name.matches(field_name))
			{
				// Two schema fields matching the same parameter would be
				// ambiguous
				Some(param_idx) if !used[param_idx] => {
					used[param_idx] = true;
					param_for_field.push(param_idx);
				}
				_ => continue 'constructors,
			}
		}
		let satisfiable = constructor
			.parameters
			.iter()
			.zip(&used)
			.all(|(parameter, &used)| used || parameter.optional || parameter.default.is_some());
		if satisfiable {
			return Some((constructor_idx, param_for_field));
		}
	}
	None
}

enum ParamSource {
	/// Take the value read for the n-th schema field
	Field(usize),
	/// No schema field matched: use the parameter default
	Default(Value),
}

fn build_with_constructor(
	ctx: &mut BuildContext<'_>,
	spec: &RecordSpec,
	constructor: usize,
	param_for_field: Vec<usize>,
	schema_fields: &[(String, SchemaKey)],
) -> Result<ReadFn, BuildError> {
	let constructor = &spec.constructors[constructor];

	// Field readers in schema order - the wire format dictates read order,
	// even though the value is assembled in parameter order below
	let mut field_reads = Vec::with_capacity(schema_fields.len());
	for (&(_, field_schema), &param_idx) in schema_fields.iter().zip(&param_for_field) {
		field_reads.push(ctx.build(constructor.parameters[param_idx].type_, field_schema)?);
	}

	let assembly: Vec<(Arc<str>, ParamSource)> = constructor
		.parameters
		.iter()
		.enumerate()
		.map(|(param_idx, parameter)| {
			let source = match param_for_field.iter().position(|&p| p == param_idx) {
				Some(field_idx) => ParamSource::Field(field_idx),
				None => ParamSource::Default(
					parameter.default.clone().unwrap_or(Value::Null),
				),
			};
			(Arc::from(parameter.name.as_str()), source)
		})
		.collect();
	let name: Arc<str> = Arc::from(spec.name.as_str());

	Ok(Arc::new(move |state| {
		let mut state = state.nested()?;
		let mut read_values = Vec::with_capacity(field_reads.len());
		for read in &field_reads {
			read_values.push(read(&mut state)?);
		}
		let fields = assembly
			.iter()
			.map(|(param_name, source)| {
				let value = match *source {
					ParamSource::Field(field_idx) => {
						std::mem::replace(&mut read_values[field_idx], Value::Null)
					}
					ParamSource::Default(ref default) => default.clone(),
				};
				(Arc::clone(param_name), value)
			})
			.collect();
		Ok(Value::Record(Box::new(StructValue {
			name: Arc::clone(&name),
			fields,
		})))
	}))
}

enum FieldAction {
	/// Assign the read value to the n-th target member
	Assign(usize, ReadFn),
	/// No target member matched: read against the surrogate target to
	/// advance the byte stream, and drop the value
	Discard(ReadFn),
}

fn build_with_members(
	ctx: &mut BuildContext<'_>,
	spec: &RecordSpec,
	schema_fields: &[(String, SchemaKey)],
) -> Result<ReadFn, BuildError> {
	let member_defaults: Vec<(Arc<str>, Value)> = spec
		.fields
		.iter()
		.map(|member| {
			(
				Arc::from(member.name.as_str()),
				convert::default_value(ctx.types(), member.type_),
			)
		})
		.collect();

	let mut actions = Vec::with_capacity(schema_fields.len());
	for &(ref field_name, field_schema) in schema_fields {
		match spec
			.fields
			.iter()
			.position(|member| member.name.matches(field_name))
		{
			Some(member_idx) => actions.push(FieldAction::Assign(
				member_idx,
				ctx.build(spec.fields[member_idx].type_, field_schema)?,
			)),
			None => {
				let any = ctx.types().any();
				actions.push(FieldAction::Discard(ctx.build(any, field_schema)?));
			}
		}
	}
	let name: Arc<str> = Arc::from(spec.name.as_str());

	Ok(Arc::new(move |state| {
		let mut state = state.nested()?;
		let mut fields = member_defaults.clone();
		for action in &actions {
			match action {
				FieldAction::Assign(member_idx, read) => {
					fields[*member_idx].1 = read(&mut state)?
				}
				FieldAction::Discard(read) => {
					read(&mut state)?;
				}
			}
		}
		Ok(Value::Record(Box::new(StructValue {
			name: Arc::clone(&name),
			fields,
		})))
	}))
}
