use std::borrow::Cow;

/// Any error that may happen when a built reader decodes a datum
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DeError {
	/// The byte stream does not describe a valid datum for the schema the
	/// reader was built from (EOF, invalid boolean byte, varint longer than
	/// 10 bytes, invalid UTF-8, malformed logical-type payload, ...)
	#[error("{0}")]
	Decode(Cow<'static, str>),
	/// The datum is valid but its value does not fit the target shape
	/// (checked numeric conversion loss, enum or union index out of range,
	/// duration with a non-zero month count, ...)
	#[error("Value does not fit in the target representation: {0}")]
	Overflow(Cow<'static, str>),
	/// The underlying byte source failed
	#[error("Encountered IO error when attempting to read for deserialization")]
	Io(#[source] std::io::Error),
}

impl DeError {
	/// A [`Decode`](Self::Decode) error from a static string
	///
	/// If you need a dynamic string use `DeError::custom(format_args!(...))`
	pub fn new(s: &'static str) -> Self {
		Self::Decode(Cow::Borrowed(s))
	}

	/// A [`Decode`](Self::Decode) error from anything displayable
	pub fn custom(msg: impl std::fmt::Display) -> Self {
		Self::Decode(Cow::Owned(msg.to_string()))
	}

	pub(crate) fn unexpected_eof() -> Self {
		Self::new("Unexpected end of slice while deserializing")
	}

	pub(crate) fn io(io_error: std::io::Error) -> Self {
		Self::Io(io_error)
	}

	/// An [`Overflow`](Self::Overflow) error from a static string
	///
	/// If you need a dynamic string use
	/// `DeError::overflow_custom(format_args!(...))`
	pub fn overflow(s: &'static str) -> Self {
		Self::Overflow(Cow::Borrowed(s))
	}

	/// An [`Overflow`](Self::Overflow) error from anything displayable
	pub fn overflow_custom(msg: impl std::fmt::Display) -> Self {
		Self::Overflow(Cow::Owned(msg.to_string()))
	}

	/// If this error was caused by an IO error, return it
	pub fn io_error(&self) -> Option<&std::io::Error> {
		match self {
			Self::Io(io_error) => Some(io_error),
			_ => None,
		}
	}
}
