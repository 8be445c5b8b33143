//! Registry implementations

pub mod pgxn;

pub use pgxn::PgxnRegistry;
