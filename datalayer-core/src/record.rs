//! Core traits for records held by a store, and id generation.
//!
//! A store never inspects the structure of its records. It only needs to clone them
//! and, for the identity-aware stores, to read and assign their ids. These
//! capabilities are expressed as traits so each record type states them explicitly,
//! either by hand or through the derive macros in `datalayer-macros`.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
};
use uuid::Uuid;

/// Any value that can be held by a store.
///
/// `Clone` must produce a deep, independent copy: stores clone on every read and
/// write so that callers never alias stored state. This trait is implemented
/// automatically for every type that satisfies its bounds.
pub trait Record: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Record for T {}

/// A record with a unique identifier.
///
/// Uniqueness is a convention, not something the store enforces: when several
/// records share an id, the first one in storage order is the one that id-targeted
/// operations see.
///
/// # Example
///
/// ```ignore
/// use datalayer::record::Identifiable;
///
/// #[derive(Debug, Clone, Default)]
/// pub struct Note {
///     pub id: String,
///     pub body: String,
/// }
///
/// impl Identifiable for Note {
///     type Id = String;
///
///     fn id(&self) -> &String { &self.id }
///     fn is_zero_id(&self) -> bool { self.id.is_empty() }
///     fn with_id(mut self, id: String) -> Self {
///         self.id = id;
///         self
///     }
/// }
/// ```
pub trait Identifiable: Record {
    /// The id type (string, integer, UUID, ...).
    type Id: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Returns a reference to this record's id.
    fn id(&self) -> &Self::Id;

    /// Returns `true` when the id is unset and must be generated on create.
    fn is_zero_id(&self) -> bool;

    /// Returns this record with its id replaced.
    fn with_id(self, id: Self::Id) -> Self;

    /// Returns `true` when this record carries the given id.
    fn is_equal_id(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}

/// Source of fresh ids for records created without one.
pub trait IdGenerator<K>: Send + Sync {
    /// Produces the next id. Successive calls must not repeat.
    fn next_id(&self) -> K;
}

/// Id types that have a process-wide default generation strategy.
pub trait GeneratedId: Sized {
    /// Generates a new, time-ordered, random id.
    fn generate() -> Self;
}

impl GeneratedId for String {
    fn generate() -> Self {
        Uuid::now_v7().simple().to_string()
    }
}

impl GeneratedId for Uuid {
    fn generate() -> Self {
        Uuid::now_v7()
    }
}

/// The default generator: time-ordered random ids (UUID v7).
///
/// String ids use the 32 character hyphenless form.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl<K: GeneratedId> IdGenerator<K> for RandomIdGenerator {
    fn next_id(&self) -> K {
        K::generate()
    }
}

/// Deterministic generator producing `1, 2, 3, ...`.
///
/// Mostly useful in tests where generated ids need to be predictable.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    next: AtomicU64,
}

impl SequenceIdGenerator {
    /// Creates a generator whose first id is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self { next: AtomicU64::new(start) }
    }

    fn advance(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequenceIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator<u64> for SequenceIdGenerator {
    fn next_id(&self) -> u64 {
        self.advance()
    }
}

impl IdGenerator<String> for SequenceIdGenerator {
    fn next_id(&self) -> String {
        self.advance().to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_string_ids_are_unique() {
        let generator = RandomIdGenerator;
        let first: String = generator.next_id();
        let second: String = generator.next_id();

        assert_eq!(first.len(), 32);
        assert_ne!(first, second);
    }

    #[test]
    fn random_uuid_ids_are_v7() {
        let id: Uuid = RandomIdGenerator.next_id();

        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn sequence_generator_counts_up() {
        let generator = SequenceIdGenerator::default();

        assert_eq!(IdGenerator::<u64>::next_id(&generator), 1);
        assert_eq!(IdGenerator::<String>::next_id(&generator), "2");
        assert_eq!(IdGenerator::<u64>::next_id(&generator), 3);
    }
}
