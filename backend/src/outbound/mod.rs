//! Outbound adapters implementing the domain's driven ports against real
//! infrastructure: PostgreSQL storage and the HTTP payment provider.

pub mod payments;
pub mod persistence;
