//! Offset-less expiration stamps.
//!
//! Expirations are stored as `YYYY-MM-DDTHH:MM:SS` wall-clock values without any offset, the
//! format other services reading the token rows already expect. Comparing stamps written on
//! hosts with different local offsets is therefore imprecise by up to the offset difference.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros};
// self
use crate::_prelude::*;

const EXPIRATION_FORMAT: &[BorrowedFormatItem<'static>] =
	macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Instant after which a token reads as expired.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiration(PrimitiveDateTime);
impl Expiration {
	/// Wraps a wall-clock instant, truncating sub-second precision.
	pub fn at(instant: PrimitiveDateTime) -> Self {
		Self(instant.replace_nanosecond(0).unwrap_or(instant))
	}

	/// Computes `now + window`.
	pub fn after(now: PrimitiveDateTime, window: Duration) -> Self {
		Self::at(now.saturating_add(window))
	}

	/// Parses the `YYYY-MM-DDTHH:MM:SS` representation.
	pub fn parse(value: &str) -> Result<Self, time::error::Parse> {
		PrimitiveDateTime::parse(value, EXPIRATION_FORMAT).map(Self)
	}

	/// Returns the wrapped wall-clock instant.
	pub fn instant(self) -> PrimitiveDateTime {
		self.0
	}

	/// Returns `true` once `now` has reached the stamp.
	pub fn is_expired_at(self, now: PrimitiveDateTime) -> bool {
		now >= self.0
	}
}
impl Debug for Expiration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Expiration({self})")
	}
}
impl Display for Expiration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let formatted = self.0.format(EXPIRATION_FORMAT).map_err(|_| std::fmt::Error)?;

		f.write_str(&formatted)
	}
}
impl FromStr for Expiration {
	type Err = time::error::Parse;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Serialize for Expiration {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}
impl<'de> Deserialize<'de> for Expiration {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse(&raw).map_err(DeError::custom)
	}
}
