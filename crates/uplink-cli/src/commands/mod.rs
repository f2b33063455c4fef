//! Command handlers.

pub(crate) mod login;
pub(crate) mod upload;
