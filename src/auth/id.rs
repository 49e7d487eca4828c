//! Strongly typed identifiers shared by tokens, clients, and users.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		def_id! { @define $name, $doc, $kind }
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
	};
	($name:ident, $doc:literal, $kind:literal, redacted) => {
		def_id! { @define $name, $doc, $kind }
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(concat!($kind, "(<redacted>)"))
			}
		}
	};
	(@define $name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (token, client, user).
		kind: &'static str,
	},
	/// The identifier contains control characters.
	#[error("{kind} identifier contains control characters.")]
	ContainsControl {
		/// Kind of identifier (token, client, user).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte length.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier (token, client, user).
		kind: &'static str,
		/// Maximum permitted byte length.
		max: usize,
	},
}

def_id! {
	TokenId,
	"Opaque identifier of an issued access or refresh token; it is the bearer secret.",
	"Token",
	redacted
}
def_id! { ClientId, "Identifier of the client application a token was issued to.", "Client" }
def_id! { UserId, "Identifier of the user a token is bound to.", "User" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_control) {
		return Err(IdentifierError::ContainsControl { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_empty_and_control_characters() {
		assert!(TokenId::new("").is_err());
		assert!(UserId::new("user\n42").is_err());

		let client = ClientId::new("shop-10001").expect("Client fixture should be valid.");

		assert_eq!(client.as_ref(), "shop-10001");
		assert_eq!(format!("{client:?}"), "Client(shop-10001)");
	}

	#[test]
	fn token_ids_stay_out_of_debug_output() {
		let token = TokenId::new("bearer-secret").expect("Token fixture should be valid.");

		assert_eq!(format!("{token:?}"), "Token(<redacted>)");
		assert_eq!(token.to_string(), "bearer-secret");
	}

	#[test]
	fn serde_enforces_validation() {
		let user: UserId =
			serde_json::from_str("\"user-7\"").expect("User id should deserialize successfully.");

		assert_eq!(user.to_string(), "user-7");
		assert!(serde_json::from_str::<UserId>("\"\"").is_err());

		let too_long = format!("\"{}\"", "a".repeat(IDENTIFIER_MAX_LEN + 1));

		assert!(serde_json::from_str::<TokenId>(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_str_lookup() {
		let map: HashMap<TokenId, u8> = HashMap::from_iter([(
			TokenId::new("token-1").expect("Token id used for lookup should be valid."),
			3_u8,
		)]);

		assert_eq!(map.get("token-1"), Some(&3));
	}
}
