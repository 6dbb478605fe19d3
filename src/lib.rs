//! probing-map: a single-threaded hash map built on open addressing over one
//! resizable array, with linear probing and tombstone deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Every slot of the backing `Vec` is `Empty`, `Occupied` or a
//!   `Tombstone`. All keyed operations share one probe routine that starts
//!   at the key's home index (`hash % capacity`) and walks forward with
//!   wraparound.
//! - A probe stops at an equal live key, at an `Empty` slot, or after one
//!   full pass. Tombstones never stop it; the first one seen is remembered
//!   as the insertion point for a new key.
//!
//! Growth
//! - Every `put` first checks `(size + 1) / capacity > MAX_LOAD_FACTOR`.
//!   If it holds, the table is rebuilt at `2 * capacity + 3` slots before
//!   the key's home index is computed, so placement always uses the new
//!   length.
//! - Rebuilds (growth or `resize_backing_array`) linear-probe every live
//!   entry into a fresh table from its stored hash. Tombstones are dropped; colliding keys are never
//!   overwritten.
//! - There is no shrinking; `clear` reinstalls a table of
//!   `INITIAL_CAPACITY` slots.
//!
//! Deletion
//! - `remove` moves the value out to the caller and leaves a tombstone so
//!   that keys further along the cluster stay reachable. `values`,
//!   `key_set`, `count` and the iterators only see live entries.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the `u64` hash computed when it was put. Rebuilds
//!   place entries by that stored hash and never call `K: Hash` or `K: Eq`,
//!   so user code cannot panic halfway through a rebuild.
//!
//! Constraints
//! - Single-threaded: the map is `!Sync`. A debug-only check panics if
//!   `K: Hash` or `K: Eq` calls back into the map during a probe.
//! - Hashing is delegated to the caller's `BuildHasher` (std `RandomState`
//!   by default). Keys compare by `Eq`.
//!
//! Errors
//! - Lookups and removals of absent keys return `MapError::NotFound`.
//! - `resize_backing_array` below the live count returns
//!   `MapError::InvalidLength` and leaves the map untouched.
//!
//! Logging
//! - Table rebuilds are reported through the `log` facade (`debug!` when
//!   the load factor triggers growth, `trace!` per rebuild). The crate
//!   never installs a logger.

mod error;
pub mod probing_map;
mod probing_map_proptest;
mod reentrancy;

// Public surface
pub use error::MapError;
// `key_set` returns a `hashbrown::HashSet`; re-exported so callers can name it.
pub use hashbrown;
pub use probing_map::{
    Entry, IntoIter, Iter, IterMut, Keys, ProbingMap, Slot, INITIAL_CAPACITY, MAX_LOAD_FACTOR,
};
