//! Auth-domain identifiers, credentials, scopes, and token models.

pub mod credentials;
pub mod id;
pub mod scope;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use scope::*;
pub use token::{expiration::*, kind::*, record::*};
