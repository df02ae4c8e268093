//! Distance math, spatial queries, validation and the distance histogram.

pub mod histogram;
pub mod spatial;
pub mod validation;
