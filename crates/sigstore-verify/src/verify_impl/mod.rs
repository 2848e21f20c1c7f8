//! Verification building blocks used by [`crate::Verifier`]

pub mod ca;
pub mod certificate;
pub mod key;
pub mod sct;
pub mod tlog;
