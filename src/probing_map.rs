//! ProbingMap: open addressing over a single `Vec` of slots, linear probing,
//! tombstone deletion and load-factor driven growth.

use crate::error::MapError;
use crate::reentrancy::ProbeCheck;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::HashSet;
use log::{debug, trace};
use std::collections::hash_map::RandomState;

/// Backing length used by [`ProbingMap::new`] and restored by
/// [`ProbingMap::clear`].
pub const INITIAL_CAPACITY: usize = 13;

/// Growth threshold. A `put` that would make `(size + 1) / capacity` exceed
/// this grows the table to `2 * capacity + 3` before probing.
pub const MAX_LOAD_FACTOR: f64 = 0.67;

/// A stored key/value pair, with the key's hash computed once at insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

impl<K, V> Entry<K, V> {
    /// The stored key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Hash recorded when the entry was inserted; rebuilds place by it.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// One position of the backing array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<K, V> {
    /// Never written since the last rebuild. Terminates a probe.
    Empty,
    /// Holds a live entry.
    Occupied(Entry<K, V>),
    /// Held an entry that was removed. Probes continue through it and `put`
    /// may reuse it.
    Tombstone,
}

impl<K, V> Slot<K, V> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    /// The live entry, if any.
    pub fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    fn entry_mut(&mut self) -> Option<&mut Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of a linear probe for one key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Probe {
    /// A live slot holding an equal key.
    Found(usize),
    /// Where the key would go: the first tombstone passed, or else the
    /// terminating empty slot.
    Vacant(usize),
    /// Every slot was scanned: no equal key and nowhere to put one.
    Exhausted,
}

fn empty_table<K, V>(len: usize) -> Vec<Slot<K, V>> {
    core::iter::repeat_with(|| Slot::Empty).take(len).collect()
}

/// Hash map over a single slot array with linear probing and tombstone
/// deletion. See the crate docs for the growth and deletion rules.
pub struct ProbingMap<K, V, S = RandomState> {
    hasher: S,
    table: Vec<Slot<K, V>>,
    size: usize,
    probe_check: ProbeCheck,
}

impl<K, V> ProbingMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with [`INITIAL_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Empty map with `capacity` slots.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for ProbingMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ProbingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Empty map with [`INITIAL_CAPACITY`] slots hashing through `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(INITIAL_CAPACITY, hasher)
    }

    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        assert!(capacity > 0, "initial capacity must be positive");
        Self {
            hasher,
            table: empty_table(capacity),
            size: 0,
            probe_check: ProbeCheck::new(),
        }
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when no entry is live; tombstones do not count.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Length of the backing array.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// Live entries per slot. Zero for a zero-length table.
    pub fn load_factor(&self) -> f64 {
        if self.table.is_empty() {
            0.0
        } else {
            self.size as f64 / self.table.len() as f64
        }
    }

    /// Number of tombstones currently occupying slots.
    pub fn tombstones(&self) -> usize {
        self.table.iter().filter(|s| s.is_tombstone()).count()
    }

    /// The `BuildHasher` keys are hashed with.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Read-only view of the backing array, for inspection and tests.
    pub fn table(&self) -> &[Slot<K, V>] {
        &self.table
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Linear probe for `q` (whose hash is `hash`) in the table, starting at
    /// its home index.
    ///
    /// Tombstones are skipped, remembering the first one as the insertion
    /// point. The scan stops at an equal live key, at an empty slot, or after
    /// one full pass.
    fn probe<Q>(&self, hash: u64, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let _g = self.probe_check.enter();
        let table = &self.table;
        let len = table.len();
        if len == 0 {
            return Probe::Exhausted;
        }
        let home = (hash % len as u64) as usize;
        let mut reusable = None;
        for i in 0..len {
            let j = (home + i) % len;
            match &table[j] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(j)),
                Slot::Tombstone => {
                    reusable.get_or_insert(j);
                }
                Slot::Occupied(e) if e.key.borrow() == q => return Probe::Found(j),
                Slot::Occupied(_) => {}
            }
        }
        match reusable {
            Some(j) => Probe::Vacant(j),
            None => Probe::Exhausted,
        }
    }

    fn needs_growth(&self) -> bool {
        (self.size + 1) as f64 / self.table.len() as f64 > MAX_LOAD_FACTOR
    }

    fn grow(&mut self) {
        let new_len = 2 * self.table.len() + 3;
        debug!(
            "growing backing array: {} -> {} slots ({} live)",
            self.table.len(),
            new_len,
            self.size
        );
        self.rebuild(new_len);
    }

    /// Replace the table with `new_len` empty slots and re-place every live
    /// entry by linear probing from its stored hash. Tombstones are dropped.
    /// Requires `new_len >= size`.
    ///
    /// Never calls `K: Hash` or `K: Eq`: keys are already distinct and the
    /// fresh table has no tombstones, so the first empty slot is the right one.
    fn rebuild(&mut self, new_len: usize) {
        debug_assert!(new_len >= self.size);
        let old = mem::replace(&mut self.table, empty_table(new_len));
        let old_len = old.len();
        let mut dropped = 0usize;
        for slot in old {
            match slot {
                Slot::Occupied(entry) => {
                    let home = (entry.hash % new_len as u64) as usize;
                    let j = (0..new_len)
                        .map(|i| (home + i) % new_len)
                        .find(|&j| self.table[j].is_empty())
                        .expect("rebuilt table has a free slot for every live entry");
                    self.table[j] = Slot::Occupied(entry);
                }
                Slot::Tombstone => dropped += 1,
                Slot::Empty => {}
            }
        }
        trace!(
            "rebuilt backing array: {} -> {} slots, {} live, {} tombstones dropped",
            old_len,
            new_len,
            self.size,
            dropped
        );
    }

    /// Insert `key -> value`. Returns the previous value when `key` was
    /// already live; its slot is updated in place and `size` is unchanged.
    ///
    /// The load-factor check runs first on every call, so the table may grow
    /// even when the key already exists. The home index is always taken
    /// against the post-growth length. `K: Hash` runs once, before anything
    /// is modified.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        if self.needs_growth() {
            self.grow();
        }
        loop {
            match self.probe(hash, &key) {
                Probe::Found(j) => {
                    return self.table[j]
                        .entry_mut()
                        .map(|e| mem::replace(&mut e.value, value));
                }
                Probe::Vacant(j) => {
                    self.table[j] = Slot::Occupied(Entry { key, value, hash });
                    self.size += 1;
                    return None;
                }
                // Only reachable if growth left no free slot; grow again.
                Probe::Exhausted => self.grow(),
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.probe(self.make_hash(key), key) {
            Probe::Found(j) => self.table[j]
                .entry()
                .map(|e| &e.value)
                .ok_or(MapError::NotFound),
            Probe::Vacant(_) | Probe::Exhausted => Err(MapError::NotFound),
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.probe(self.make_hash(key), key) {
            Probe::Found(j) => self.table[j]
                .entry_mut()
                .map(|e| &mut e.value)
                .ok_or(MapError::NotFound),
            Probe::Vacant(_) | Probe::Exhausted => Err(MapError::NotFound),
        }
    }

    /// Remove `key`, leaving a tombstone in its slot.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Probe::Found(j) = self.probe(self.make_hash(key), key) else {
            return Err(MapError::NotFound);
        };
        match mem::replace(&mut self.table[j], Slot::Tombstone) {
            Slot::Occupied(entry) => {
                self.size -= 1;
                Ok(entry.value)
            }
            other => {
                self.table[j] = other;
                Err(MapError::NotFound)
            }
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).is_ok()
    }

    /// Number of live entries whose value equals `value`.
    pub fn count(&self, value: &V) -> usize
    where
        V: PartialEq,
    {
        self.table
            .iter()
            .filter_map(Slot::entry)
            .filter(|e| e.value == *value)
            .count()
    }

    /// Drop every entry and start over with [`INITIAL_CAPACITY`] slots,
    /// regardless of the current capacity.
    pub fn clear(&mut self) {
        self.table = empty_table(INITIAL_CAPACITY);
        self.size = 0;
    }

    /// Set of live keys.
    ///
    /// The set type is [`hashbrown::HashSet`], re-exported as
    /// `probing_map::hashbrown` so callers can name it without depending on a
    /// matching `hashbrown` version themselves.
    pub fn key_set(&self) -> HashSet<&K> {
        self.keys().collect()
    }

    /// Live values in backing-array order. Tombstones contribute nothing.
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    /// Rebuild the backing array with exactly `length` slots, re-placing every
    /// live entry by linear probing from its stored hash and discarding
    /// tombstones.
    ///
    /// Fails with [`MapError::InvalidLength`] if `length` is smaller than the
    /// number of live entries; the map is left untouched in that case.
    pub fn resize_backing_array(&mut self, length: usize) -> Result<(), MapError> {
        if length < self.size {
            return Err(MapError::InvalidLength {
                requested: length,
                size: self.size,
            });
        }
        self.rebuild(length);
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.iter(),
            remaining: self.size,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.iter_mut(),
            remaining: self.size,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }
}

impl<K, V, S> Clone for ProbingMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            table: self.table.clone(),
            size: self.size,
            probe_check: ProbeCheck::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for ProbingMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.table
                    .iter()
                    .filter_map(Slot::entry)
                    .map(|e| (&e.key, &e.value)),
            )
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ProbingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ProbingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::with_hasher(S::default());
        m.extend(iter);
        m
    }
}

/// Iterator over live entries in backing-array order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.it.by_ref().find_map(Slot::entry)?;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over live entries with mutable values.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.it.by_ref().find_map(Slot::entry_mut)?;
        self.remaining -= 1;
        Some((&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Iterator over live keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Owning iterator over live entries.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.it.by_ref().find_map(|s| match s {
            Slot::Occupied(e) => Some(e),
            _ => None,
        })?;
        self.remaining -= 1;
        Some((e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for ProbingMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.table.into_iter(),
            remaining: self.size,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ProbingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
