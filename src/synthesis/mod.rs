//! Type synthesis: closes the schema hierarchy and resolves properties.
//!
//! Classes become [`SynthesizedType`]s whose capability set is their own
//! declared properties plus every ancestor's. Properties become
//! [`PropertySpec`]s whose domain and range are resolved up the
//! subproperty chain.

mod closure;
mod synthesizer;
mod types;

pub use synthesizer::{SynthesizedSchema, Synthesizer};
pub use types::{PropertySpec, RangeConstraint, SynthesizedType};
