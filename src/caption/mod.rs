//! Caption candidates: the record type, where they come from, and how they are cleaned.

pub(crate) mod model;
pub(crate) mod provider;
pub(crate) mod safety;
