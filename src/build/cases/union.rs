use super::*;

use crate::{schema::SchemaNode, types::TypeStore};

/// Hook deciding which target shape each union branch decodes into
///
/// Receives the type store, the union's overall target and the branch's
/// schema node; returns the target for that branch, or `None` to fall back
/// to the default selection.
pub type SelectType =
	dyn Fn(&mut TypeStore, TypeKey, &SchemaNode) -> Result<Option<TypeKey>, BuildError>
		+ Send
		+ Sync;

/// Decodes a `union` schema: a branch index followed by the chosen branch's
/// encoding
///
/// By default every branch decodes into the union's overall target, except
/// that an [`Optional`](TypeSpec::Optional) target selects its wrapped shape
/// for the non-null branches (the null branch yields [`Value::Null`]). A
/// `select_type` hook can override the selection per branch, which is how
/// polymorphic mappings are expressed.
pub struct UnionCase {
	select_type: Option<Box<SelectType>>,
}

impl UnionCase {
	/// A union case with the default branch-target selection
	pub fn new() -> Self {
		Self { select_type: None }
	}

	/// A union case with a custom branch-target selection hook
	pub fn with_select_type(
		select_type: impl Fn(&mut TypeStore, TypeKey, &SchemaNode) -> Result<Option<TypeKey>, BuildError>
			+ Send
			+ Sync
			+ 'static,
	) -> Self {
		Self {
			select_type: Some(Box::new(select_type)),
		}
	}
}

impl Default for UnionCase {
	fn default() -> Self {
		Self::new()
	}
}

impl BuildCase for UnionCase {
	fn name(&self) -> &'static str {
		"union"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let variants = match ctx.node(schema)?.type_ {
			RegularType::Union(ref union) if !union.variants.is_empty() => union.variants.clone(),
			RegularType::Union(_) => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					"union schema has no variants",
				)))
			}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected a union schema, got {}", schema_kind(other)),
				)))
			}
		};

		let mut branch_reads = Vec::with_capacity(variants.len());
		for branch_schema in variants {
			let branch_node = ctx.node(branch_schema)?.clone();
			let selected = match &self.select_type {
				Some(select_type) => select_type(ctx.types(), target, &branch_node)?,
				None => None,
			};
			let selected = match selected {
				Some(key) => key,
				None => match *ctx.spec(target)? {
					// The null branch of an optional yields the absence
					// value itself, so it keeps the optional as its target
					TypeSpec::Optional(inner)
						if !matches!(branch_node.type_, RegularType::Null) =>
					{
						inner
					}
					_ => target,
				},
			};
			if matches!(branch_node.type_, RegularType::Null) {
				match *ctx.spec(selected)? {
					TypeSpec::Optional(_) | TypeSpec::Any => {}
					ref other => {
						return Err(BuildError::unsupported_type(
							spec_kind(other),
							"the null variant of a union needs a target with an \
								absent representation",
						))
					}
				}
			}
			branch_reads.push(ctx.build(selected, branch_schema)?);
		}

		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			let mut state = state.nested()?;
			let index = decode::read_long(&mut state)?;
			let read = usize::try_from(index)
				.ok()
				.and_then(|index| branch_reads.get(index))
				.ok_or_else(|| {
					DeError::overflow_custom(format_args!(
						"union index {index} out of range (0..{})",
						branch_reads.len()
					))
				})?;
			read(&mut state)
		})))
	}
}
