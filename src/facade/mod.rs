//! The extension facade: configuration-time binding of a primary record
//! type to an extension record type, plus the per-instance wrapper that
//! carries the lazy materialization, save sync and cascade destroy.

mod binding;
mod extended;

pub use binding::{BindOptions, ExtensionBinding};
pub use extended::ExtendedRecord;
