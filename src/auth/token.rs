//! Token records, kinds, and expiration stamps.

pub mod expiration;
pub mod kind;
pub mod record;
