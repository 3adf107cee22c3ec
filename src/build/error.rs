use std::borrow::Cow;

/// Any error that may happen while building a reader
///
/// Note the difference with [`Rejection`]: a rejection is one case declining
/// one (schema, target type) pair, which is part of normal dispatch. A
/// `BuildError` aborts the whole build.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum BuildError {
	/// Every case declined the (schema, target type) pair
	#[error("No deserializer case matched the (schema, target type) pair:{}", RejectionList(.rejections.as_slice()))]
	NoMatch {
		/// Why each case declined
		rejections: Vec<Rejection>,
	},
	/// A case matched the schema's logical type but its physical type is
	/// invalid, or the schema is malformed in a way no case can recover from
	#[error("Unsupported schema: {reason}")]
	UnsupportedSchema {
		/// What is wrong with the schema
		reason: String,
	},
	/// A case matched the schema but the target shape cannot receive the
	/// decoded value (no matching enum symbol, numeric schema for a
	/// non-numeric target, null union variant for a target with no absent
	/// representation, ...)
	#[error("Unsupported target type {type_}: {detail}")]
	UnsupportedType {
		/// The offending target shape
		type_: String,
		/// Why it cannot receive the decoded value
		detail: String,
	},
	/// Internal bookkeeping violation in the cyclic-reader slot table
	///
	/// This indicates a bug in a builder case, not in the schema or the
	/// target description.
	#[error("Reader slot bookkeeping violation: {0}")]
	CycleViolation(&'static str),
}

impl BuildError {
	/// An [`UnsupportedSchema`](Self::UnsupportedSchema) error
	pub fn unsupported_schema(reason: impl std::fmt::Display) -> Self {
		Self::UnsupportedSchema {
			reason: reason.to_string(),
		}
	}

	/// An [`UnsupportedType`](Self::UnsupportedType) error
	pub fn unsupported_type(
		type_: impl std::fmt::Display,
		detail: impl std::fmt::Display,
	) -> Self {
		Self::UnsupportedType {
			type_: type_.to_string(),
			detail: detail.to_string(),
		}
	}
}

/// One case declining one (schema, target type) pair
///
/// Collected by the dispatcher; if every case rejects, they are reported
/// together in [`BuildError::NoMatch`].
#[derive(Clone, Debug)]
pub struct Rejection {
	/// Name of the declining case
	pub case: &'static str,
	/// Which side of the pair did not match
	pub kind: RejectionKind,
	/// Human-readable detail
	pub detail: Cow<'static, str>,
}

/// Which side of the (schema, target type) pair a case declined on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
	/// The schema is not of the kind this case decodes
	SchemaKindMismatch,
	/// The target shape cannot receive what this case decodes
	TypeKindMismatch,
}

impl Rejection {
	/// A rejection because the schema is not of the kind this case decodes
	pub fn schema_kind(case: &'static str, detail: impl Into<Cow<'static, str>>) -> Self {
		Self {
			case,
			kind: RejectionKind::SchemaKindMismatch,
			detail: detail.into(),
		}
	}

	/// A rejection because the target shape cannot receive what this case
	/// decodes
	pub fn type_kind(case: &'static str, detail: impl Into<Cow<'static, str>>) -> Self {
		Self {
			case,
			kind: RejectionKind::TypeKindMismatch,
			detail: detail.into(),
		}
	}
}

impl std::fmt::Display for Rejection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kind = match self.kind {
			RejectionKind::SchemaKindMismatch => "schema kind mismatch",
			RejectionKind::TypeKindMismatch => "type kind mismatch",
		};
		write!(f, "{}: {} ({})", self.case, kind, self.detail)
	}
}

struct RejectionList<'a>(&'a [Rejection]);
impl std::fmt::Display for RejectionList<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for rejection in self.0 {
			write!(f, "\n- {}", rejection)?;
		}
		Ok(())
	}
}
