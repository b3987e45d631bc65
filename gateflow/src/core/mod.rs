//! Core value types shared by the sync engine and the request pipeline.

mod descriptor;

pub use descriptor::{FilterDescriptor, FilterKind};
