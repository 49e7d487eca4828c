//! Scope attached to issued tokens.

// self
use crate::_prelude::*;

/// Space-delimited OAuth scope, stored and echoed verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(String);
impl ScopeSet {
	/// Joins `scopes` with single spaces.
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let scopes = scopes.into_iter().map(|scope| scope.as_ref().to_owned()).collect::<Vec<_>>();

		Self(scopes.join(" "))
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
