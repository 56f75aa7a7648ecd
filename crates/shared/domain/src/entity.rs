//! Capabilities shared by persisted entities.

/// A persisted entity with a store-assigned integer identity.
///
/// Every entity that is written through the persistence gateway implements
/// this trait, so identity and version are read through ordinary method
/// calls rather than recovered from the value at runtime.
pub trait Identifiable {
    /// Store-assigned primary key.
    fn id(&self) -> i32;

    /// Optimistic-locking counter. Declared for every entity; write-time
    /// comparison is not enforced yet.
    fn version(&self) -> i32;
}
