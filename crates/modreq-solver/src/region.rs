//! Arena region markers.
//!
//! Every [`TypeArena`](crate::TypeArena) and every handle into one is tagged
//! with the region that owns it:
//!
//! | Region | Owner | Lifetime |
//! |--------|-------|----------|
//! | [`GlobalRegion`] | one checking context | until the context is dropped |
//! | [`ModuleRegion`] | one checked module | as long as the module result |
//! | [`InstanceRegion`] | the eager checker | cleared after every statement |
//!
//! Handles from different regions are distinct types, so a provisional
//! instance-region pack can never be returned where a module-region result
//! is expected. Moving data across regions goes through
//! [`TypeArena::import`](crate::TypeArena::import).

use std::fmt::Debug;
use std::hash::Hash;

mod sealed {
    pub trait Sealed {}
}

/// A type-level arena region. Implemented only by the markers in this module.
pub trait Region: sealed::Sealed + Copy + Eq + Hash + Debug + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Types owned by a checking context (globals, published require functions).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlobalRegion {}

/// Types owned by a checked module; call results live here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleRegion {}

/// Scratch types of the eager checker, discarded after each statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceRegion {}

impl sealed::Sealed for GlobalRegion {}
impl sealed::Sealed for ModuleRegion {}
impl sealed::Sealed for InstanceRegion {}

impl Region for GlobalRegion {
    const NAME: &'static str = "global";
}

impl Region for ModuleRegion {
    const NAME: &'static str = "module";
}

impl Region for InstanceRegion {
    const NAME: &'static str = "instance";
}
