#![warn(missing_docs)]
//! Item vocabulary shared across the workspace.

mod capability;
mod item;
mod material;

pub use capability::{Capability, CapabilityHandlers, CapabilitySet, DISPATCH_ORDER};
pub use item::{fingerprint_from_url, ItemSnapshot};
pub use material::{Material, ToolCategory};

/// Resolves an opaque item instance back to a definition id.
///
/// Implementations never error: an unrecognized item is simply `None`, and
/// callers fall through to default host behavior.
pub trait IdentityResolver {
    /// Resolve `item` to its canonical definition id, if any.
    ///
    /// The returned id may borrow from either the resolver or the item (an
    /// embedded tag is returned as-is, without a table lookup).
    fn resolve<'a>(&'a self, item: &'a ItemSnapshot) -> Option<&'a str>;
}
