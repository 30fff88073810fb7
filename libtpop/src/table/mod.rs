use std::borrow::Borrow;
use std::rc::Rc;
use tracing::{debug, warn};
use crate::error::{Error, Result};
use crate::util::arena::{Arena, Handle, LLNode, iter_ll, push_front_ll};
use crate::util::bits::{PolyHasher, DEFAULT_MULTIPLIER};

// -- Configuration ------------------------------------------------------------------------------

pub const DEFAULT_INITIAL_BUCKETS: usize = 1024;
pub const DEFAULT_GROWTH_SHIFT: u32 = 1;
pub const MAX_GROWTH_SHIFT: u32 = 16;

/// Sizing and hashing parameters for a [`ChainTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of buckets the table starts with.
    pub initial_buckets: usize,
    /// The table grows once more than `bucket_count >> growth_shift` buckets are occupied,
    /// multiplying its bucket count by `1 << growth_shift`.
    pub growth_shift: u32,
    /// Multiplier of the polynomial key hash.
    pub multiplier: usize
}

impl Default for TableConfig {
    fn default() -> Self {
        return Self {
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
            growth_shift: DEFAULT_GROWTH_SHIFT,
            multiplier: DEFAULT_MULTIPLIER
        };
    }
}

impl TableConfig {
    pub fn with_initial_buckets(mut self, initial_buckets: usize) -> Self {
        self.initial_buckets = initial_buckets;
        return self;
    }

    pub fn with_growth_shift(mut self, growth_shift: u32) -> Self {
        self.growth_shift = growth_shift;
        return self;
    }

    pub fn with_multiplier(mut self, multiplier: usize) -> Self {
        self.multiplier = multiplier;
        return self;
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(Error::InvalidConfig("a table needs at least one bucket"));
        }
        if !(1..=MAX_GROWTH_SHIFT).contains(&self.growth_shift) {
            return Err(Error::InvalidConfig("growth shift must be between 1 and 16"));
        }
        return Ok(());
    }
}

// -- Keys ---------------------------------------------------------------------------------------

/// A key that can be hashed as a sequence of bytes.
///
/// A key and every form it can be borrowed as (see [`ChainTable::lookup`]) must feed the same
/// bytes, otherwise lookups through the borrowed form will search the wrong bucket.
pub trait ChainKey {
    fn feed(&self, hasher: &mut PolyHasher);
}

impl ChainKey for [u8] {
    fn feed(&self, hasher: &mut PolyHasher) { hasher.write(self); }
}

impl ChainKey for str {
    fn feed(&self, hasher: &mut PolyHasher) { hasher.write(self.as_bytes()); }
}

impl ChainKey for String {
    fn feed(&self, hasher: &mut PolyHasher) { self.as_str().feed(hasher); }
}

impl ChainKey for Vec<u8> {
    fn feed(&self, hasher: &mut PolyHasher) { self.as_slice().feed(hasher); }
}

impl ChainKey for Box<[u8]> {
    fn feed(&self, hasher: &mut PolyHasher) { (**self).feed(hasher); }
}

impl ChainKey for Rc<[u8]> {
    fn feed(&self, hasher: &mut PolyHasher) { (**self).feed(hasher); }
}

impl<K: ChainKey + ?Sized> ChainKey for &K {
    fn feed(&self, hasher: &mut PolyHasher) { (**self).feed(hasher); }
}

/// Tuples of keys hash as the concatenation of their elements.
impl<K: ChainKey, const N: usize> ChainKey for [K; N] {
    fn feed(&self, hasher: &mut PolyHasher) {
        for key in self {
            key.feed(hasher);
        }
    }
}

// -- ChainTable ---------------------------------------------------------------------------------

#[derive(Debug)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V
}

pub type EntryId<K, V> = Handle<LLNode<Entry<K, V>>>;

/// A hash table that resolves collisions by chaining entries into singly linked lists, one per
/// bucket, and grows by rehashing every entry into a larger bucket array.
///
/// # Supported Operators
/// - [`ChainTable::lookup`] finds the entry for a key.
/// - [`ChainTable::lookup_or_insert`] finds the entry for a key, or creates it.
/// - [`ChainTable::grow`] enlarges the bucket array. Insertion calls it lazily.
/// - [`ChainTable::iter`] walks every entry, bucket by bucket.
///
/// There is no removal. Entries are addressed by [`EntryId`]s which stay valid for the life of
/// the table, growth included.
///
/// # Growth
/// Growth is driven by the number of *occupied buckets*, not by the number of entries. A new
/// entry that lands in an already occupied bucket never triggers growth, no matter how long
/// that chain gets. Once more than `bucket_count >> growth_shift` buckets are occupied the
/// bucket count is multiplied by `1 << growth_shift`.
///
/// # Concurrency
/// A table is not safe to share. Growth invalidates every bucket index at once, so concurrent
/// users must hold one exclusive lock around every operation.
pub struct ChainTable<K, V> {
    config: TableConfig,
    buckets: Vec<Option<EntryId<K, V>>>,
    occupied: usize,
    entries: Arena<LLNode<Entry<K, V>>>
}

impl<K: ChainKey + Eq, V> ChainTable<K, V> {
    pub fn new() -> Result<Self> { return Self::with_config(TableConfig::default()); }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(config.initial_buckets)?;
        buckets.resize(config.initial_buckets, None);
        return Ok(Self { config, buckets, occupied: 0, entries: Arena::new() });
    }

    /// Returns the index of the bucket `key` belongs in under the current bucket count.
    pub fn hash<Q: ChainKey + ?Sized>(&self, key: &Q) -> usize {
        let mut hasher = PolyHasher::new(self.config.multiplier);
        key.feed(&mut hasher);
        return hasher.finish() % self.buckets.len();
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<EntryId<K, V>>
    where
        K: Borrow<Q>,
        Q: ChainKey + Eq + ?Sized
    {
        let bucket = self.hash(key);
        return iter_ll(&self.entries, self.buckets[bucket])
            .find(|(_, entry)| <K as Borrow<Q>>::borrow(&entry.key) == key)
            .map(|(id, _)| id);
    }

    /// Finds the entry for `key`. If there is none and `create` is true, inserts a new entry
    /// holding `key` and `value`; otherwise returns `None`.
    ///
    /// An existing entry is returned as is; `value` is dropped in that case.
    pub fn lookup_or_insert(&mut self, key: K, create: bool, value: V)
        -> Result<Option<EntryId<K, V>>>
    {
        if let Some(id) = self.lookup(&key) { return Ok(Some(id)); }
        if !create { return Ok(None); }
        return self.insert_new(key, value).map(Some);
    }

    /// Finds the entry for `key`, inserting one with the value produced by `value` if absent.
    pub fn lookup_or_insert_with(&mut self, key: K, value: impl FnOnce() -> V)
        -> Result<EntryId<K, V>>
    {
        if let Some(id) = self.lookup(&key) { return Ok(id); }
        return self.insert_new(key, value());
    }

    /// Links a new entry at the head of its bucket's chain without looking for an existing
    /// entry first. The caller must know that `key` is absent.
    ///
    /// If the insertion occupies a previously empty bucket and pushes occupancy past the growth
    /// threshold, the table grows. A failed growth is logged and otherwise ignored; the entry is
    /// inserted either way.
    pub fn insert_new(&mut self, key: K, value: V) -> Result<EntryId<K, V>> {
        debug_assert!(self.lookup(&key).is_none(), "duplicate key inserted into chain table");
        let bucket = self.hash(&key);
        let was_empty = self.buckets[bucket].is_none();
        let id = push_front_ll(&mut self.entries, &mut self.buckets[bucket], Entry { key, value })?;
        if was_empty {
            self.occupied += 1;
            if self.occupied > self.buckets.len() >> self.config.growth_shift {
                if let Err(error) = self.grow() {
                    warn!(%error, buckets = self.buckets.len(), "chain table growth failed");
                }
            }
        }
        return Ok(id);
    }

    /// Multiplies the bucket count by `1 << growth_shift` and moves every entry to the bucket
    /// its key hashes to under the new count.
    ///
    /// The new bucket array is allocated before anything else is touched; on failure the table
    /// keeps its old capacity and every entry.
    pub fn grow(&mut self) -> Result<()> {
        let old_count = self.buckets.len();
        let new_count = old_count.checked_mul(1usize << self.config.growth_shift)
            .ok_or(Error::CapacityOverflow)?;
        let mut buckets: Vec<Option<EntryId<K, V>>> = Vec::new();
        buckets.try_reserve_exact(new_count)?;
        buckets.resize(new_count, None);
        let old_buckets = std::mem::replace(&mut self.buckets, buckets);

        // Unlink every chain into one list, then relink each entry under the new modulus.
        let mut pending: Option<EntryId<K, V>> = None;
        for head in old_buckets {
            let mut cursor = head;
            while let Some(id) = cursor {
                let node = self.entries.get_mut(id);
                cursor = node.next;
                node.next = pending;
                pending = Some(id);
            }
        }

        self.occupied = 0;
        while let Some(id) = pending {
            let bucket = self.hash(&self.entries.get(id).value.key);
            let head = &mut self.buckets[bucket];
            if head.is_none() { self.occupied += 1; }
            let node = self.entries.get_mut(id);
            pending = node.next;
            node.next = *head;
            *head = Some(id);
        }

        debug!(from = old_count, to = new_count, entries = self.entries.len(),
            occupied = self.occupied, "grew chain table");
        return Ok(());
    }
}

impl<K, V> ChainTable<K, V> {
    pub fn key(&self, id: EntryId<K, V>) -> &K { return &self.entries.get(id).value.key; }

    pub fn value(&self, id: EntryId<K, V>) -> &V { return &self.entries.get(id).value.value; }

    pub fn value_mut(&mut self, id: EntryId<K, V>) -> &mut V {
        return &mut self.entries.get_mut(id).value.value;
    }

    /// Number of entries.
    pub fn len(&self) -> usize { return self.entries.len(); }

    pub fn is_empty(&self) -> bool { return self.entries.is_empty(); }

    /// Number of buckets whose chain is non-empty.
    pub fn occupied_slots(&self) -> usize { return self.occupied; }

    pub fn bucket_count(&self) -> usize { return self.buckets.len(); }

    pub fn config(&self) -> &TableConfig { return &self.config; }

    /// Walks the chain of one bucket, most recently inserted entry first.
    pub fn chain(&self, bucket: usize)
        -> impl Iterator<Item = (EntryId<K, V>, &Entry<K, V>)> + '_
    {
        return iter_ll(&self.entries, self.buckets[bucket]);
    }

    /// Returns the index of the `n`th occupied bucket, counting from zero.
    pub fn nth_occupied_bucket(&self, n: usize) -> Option<usize> {
        return self.buckets.iter()
            .enumerate()
            .filter(|(_, head)| head.is_some())
            .nth(n)
            .map(|(bucket, _)| bucket);
    }

    /// Walks every entry in bucket order, following each chain in turn.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId<K, V>, &Entry<K, V>)> + '_ {
        return self.buckets.iter().flat_map(move |head| iter_ll(&self.entries, *head));
    }
}

#[cfg(test)]
mod test_chain_table {
    use std::collections::HashMap;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;
    use crate::error::Error;
    use crate::util::misc::assert_matches;
    use super::{ChainTable, TableConfig};

    fn small_table<K: super::ChainKey + Eq, V>(buckets: usize) -> ChainTable<K, V> {
        let config = TableConfig::default().with_initial_buckets(buckets);
        return ChainTable::with_config(config).unwrap();
    }

    #[test]
    fn test_lookup_miss_on_empty_table() {
        let table: ChainTable<String, u32> = ChainTable::new().unwrap();
        assert_eq!(table.lookup("missing"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_lookup_or_insert_without_create() {
        let mut table: ChainTable<String, u32> = small_table(8);
        assert_matches!(table.lookup_or_insert("a".to_string(), false, 1), Ok(None));
        assert_eq!(table.len(), 0);
        assert_eq!(table.occupied_slots(), 0);
    }

    #[test]
    fn test_existing_entry_keeps_its_value() {
        let mut table: ChainTable<String, u32> = small_table(8);
        let first = table.lookup_or_insert("apple".to_string(), true, 1).unwrap().unwrap();
        let again = table.lookup_or_insert("apple".to_string(), true, 99).unwrap().unwrap();
        assert_eq!(first, again);
        assert_eq!(*table.value(first), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_single_bucket_grows_on_first_insert() {
        // One bucket means every key collides.
        let config = TableConfig::default().with_initial_buckets(1).with_growth_shift(1);
        let mut table: ChainTable<String, usize> = ChainTable::with_config(config).unwrap();
        table.insert_new("x".to_string(), 0).unwrap();
        // 1 occupied > 1 >> 1 == 0, so the first insertion already grew the table to 2.
        assert_eq!(table.bucket_count(), 2);
        assert_eq!(table.occupied_slots(), 1);
    }

    #[test]
    fn test_chain_collisions_are_linked_at_head() {
        // "banana" and "cherry" share a bucket whenever the bucket count divides 4.
        let mut table: ChainTable<String, u32> = small_table(4);
        table.insert_new("banana".to_string(), 2).unwrap();
        table.insert_new("cherry".to_string(), 3).unwrap();
        assert_eq!(table.hash("banana"), table.hash("cherry"));
        let bucket = table.hash("banana");
        let keys: Vec<&str> = table.chain(bucket).map(|(_, e)| e.key.as_str()).collect();
        assert_eq!(keys, vec!["cherry", "banana"]);
        assert_eq!(table.occupied_slots(), 1);
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_round_trip_across_growth() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut table: ChainTable<Vec<u8>, u64> = small_table(4);
        let mut expected: HashMap<Vec<u8>, u64> = HashMap::new();
        for _ in 0..2000 {
            let len = rng.gen_range(1..12);
            let key: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect();
            let value: u64 = rng.gen();
            let id = table.lookup_or_insert(key.clone(), true, value).unwrap().unwrap();
            let stored = *expected.entry(key).or_insert(value);
            assert_eq!(*table.value(id), stored);
        }
        assert!(table.bucket_count() > 4);
        assert_eq!(table.len(), expected.len());
        for (key, value) in &expected {
            let id = table.lookup(key.as_slice()).unwrap();
            assert_eq!(table.value(id), value);
        }
    }

    #[test]
    fn test_explicit_growth_preserves_entries() {
        let mut table: ChainTable<String, usize> = small_table(16);
        for i in 0..6 {
            table.insert_new(format!("key{i}"), i).unwrap();
        }
        let before_count = table.bucket_count();
        let before_walk = table.iter().count();
        let ids: Vec<_> = (0..6).map(|i| table.lookup(format!("key{i}").as_str()).unwrap()).collect();

        table.grow().unwrap();

        assert!(table.bucket_count() > before_count);
        assert_eq!(table.iter().count(), before_walk);
        for (i, id) in ids.into_iter().enumerate() {
            assert_eq!(table.lookup(format!("key{i}").as_str()), Some(id));
            assert_eq!(*table.value(id), i);
        }
        for (_, entry) in table.iter() {
            let bucket = table.hash(entry.key.as_str());
            assert!(table.chain(bucket).any(|(_, e)| e.key == entry.key));
        }
        let occupied = (0..table.bucket_count()).filter(|b| table.chain(*b).next().is_some()).count();
        assert_eq!(occupied, table.occupied_slots());
    }

    #[test]
    fn test_value_mut() {
        let mut table: ChainTable<&str, Vec<u32>> = small_table(8);
        let id = table.lookup_or_insert_with("k", Vec::new).unwrap();
        table.value_mut(id).push(4);
        let same = table.lookup_or_insert_with("k", || unreachable!()).unwrap();
        assert_eq!(table.value(same), &vec![4]);
    }

    #[test]
    fn test_tuple_keys_are_ordered() {
        let mut table: ChainTable<[&str; 2], u8> = small_table(8);
        table.insert_new(["a", "b"], 1).unwrap();
        assert!(table.lookup(&["a", "b"]).is_some());
        assert!(table.lookup(&["b", "a"]).is_none());
    }

    #[test]
    fn test_nth_occupied_bucket() {
        let mut table: ChainTable<String, ()> = small_table(64);
        assert_eq!(table.nth_occupied_bucket(0), None);
        table.insert_new("only".to_string(), ()).unwrap();
        assert_eq!(table.nth_occupied_bucket(0), Some(table.hash("only")));
        assert_eq!(table.nth_occupied_bucket(1), None);
    }

    #[rstest]
    #[case::no_buckets(TableConfig::default().with_initial_buckets(0))]
    #[case::no_growth(TableConfig::default().with_growth_shift(0))]
    #[case::huge_growth(TableConfig::default().with_growth_shift(40))]
    fn test_invalid_config(#[case] config: TableConfig) {
        let result: Result<ChainTable<String, u8>, Error> = ChainTable::with_config(config);
        assert_matches!(result, Err(Error::InvalidConfig(_)));
    }
}
