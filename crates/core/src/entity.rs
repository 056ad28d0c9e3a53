//! Stored records that are addressed by a storage-assigned id.

use core::fmt::Display;
use core::hash::Hash;

/// A record with an id that never changes after storage assigns it.
pub trait Entity {
    type Id: Copy + Ord + Hash + Display;

    fn id(&self) -> &Self::Id;

    /// The id by value, for use as a map key.
    fn key(&self) -> Self::Id {
        *self.id()
    }
}
