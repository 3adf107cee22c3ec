use super::*;

/// Decodes a `long` schema annotated with a timestamp logical type
/// (milliseconds or microseconds since the unix epoch) into an instant
pub struct TimestampCase;

impl BuildCase for TimestampCase {
	fn name(&self) -> &'static str {
		"timestamp"
	}

	fn try_build(
		&self,
		target: TypeKey,
		schema: SchemaKey,
		ctx: &mut BuildContext<'_>,
	) -> Result<CaseOutcome, BuildError> {
		let node = ctx.node(schema)?;
		let nanos_per_unit: i128 = match node.logical_type {
			Some(LogicalType::TimestampMillis) => 1_000_000,
			Some(LogicalType::TimestampMicros) => 1_000,
			_ => {
				return Ok(CaseOutcome::Rejected(Rejection::schema_kind(
					self.name(),
					"schema carries no timestamp logical type",
				)))
			}
		};
		// Accepting the logical type makes the physical type binding
		match node.type_ {
			RegularType::Long => {}
			ref other => {
				return Err(BuildError::unsupported_schema(format_args!(
					"timestamp logical type annotates a {} schema, expected long",
					schema_kind(other)
				)))
			}
		}
		let effective = convert::unwrap_optional(ctx.types(), target);
		match *ctx.spec(effective)? {
			TypeSpec::Timestamp | TypeSpec::Any => {}
			ref other => {
				return Ok(CaseOutcome::Rejected(Rejection::type_kind(
					self.name(),
					format!("expected a timestamp target, got {}", spec_kind(other)),
				)))
			}
		}

		Ok(CaseOutcome::Reader(Arc::new(move |state| {
			let since_epoch = decode::read_long(state)?;
			time::OffsetDateTime::from_unix_timestamp_nanos(
				i128::from(since_epoch) * nanos_per_unit,
			)
			.map(Value::Timestamp)
			.map_err(|e| {
				DeError::overflow_custom(format_args!(
					"timestamp {since_epoch} out of representable range: {e}"
				))
			})
		})))
	}
}
