//! Repository add-ons: retry decoration, composition, late initialization.

pub mod builder;
pub mod proxy;
pub mod resiliency;
