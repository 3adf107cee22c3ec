use super::*;

/// Decodes an `enum` schema: an index into the schema's symbol array,
/// mapped by name-match onto one of the target's symbols
///
/// The symbol table is resolved entirely at build time; a schema symbol with
/// no (or more than one) matching target symbol makes the build fail. At
/// decode time an index past the schema's symbol count is an overflow error,
/// it does not wrap.
pub struct EnumCase;

impl BuildCase for EnumCase {
	fn name(&self) -> &'static str {
		"enum"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let schema_symbols = match ctx.node(schema)?.type_ {
			RegularType::Enum(ref enum_) => enum_.symbols.clone(),
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					format!("expected an enum schema, got {}", schema_kind(other)),
				)))
			}
		};
		let effective = convert::unwrap_optional(ctx.types(), target);
		let enum_spec = match *ctx.spec(effective)? {
			TypeSpec::Enum(ref enum_spec) => enum_spec,
			// Under the surrogate target, an enum is just its index
			TypeSpec::Any => {
				return Ok(CaseOutcome::Reader(Arc::new(|state| {
					Ok(Value::I64(decode::read_long(state)?))
				})))
			}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected an enum target, got {}", spec_kind(other)),
				)))
			}
		};

		let symbols = schema_symbols
			.iter()
			.map(|schema_symbol| {
				let mut matching = enum_spec
					.symbols
					.iter()
					.filter(|target_symbol| target_symbol.name.matches(schema_symbol));
				match (matching.next(), matching.next()) {
					(Some(target_symbol), None) => Ok((
						Arc::<str>::from(target_symbol.name.as_str()),
						target_symbol.value,
					)),
					(None, _) => Err(BuildError::unsupported_type(
						&enum_spec.name,
						format_args!("no symbol matching {schema_symbol:?}"),
					)),
					(Some(_), Some(_)) => Err(BuildError::unsupported_type(
						&enum_spec.name,
						format_args!("multiple symbols match {schema_symbol:?}"),
					)),
				}
			})
			.collect::<Result<Vec<(Arc<str>, i64)>, BuildError>>()?;

		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			let index = decode::read_long(state)?;
			let (symbol, value) = usize::try_from(index)
				.ok()
				.and_then(|index| symbols.get(index))
				.ok_or_else(|| {
					DeError::overflow_custom(format_args!(
						"enum index {index} out of range (0..{})",
						symbols.len()
					))
				})?;
			Ok(Value::Enum(crate::value::EnumValue {
				symbol: Arc::clone(symbol),
				value: *value,
			}))
		})))
	}
}
