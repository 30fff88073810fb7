use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use crate::error::Result;
use crate::table::{ChainKey, ChainTable, TableConfig};
use crate::util::bits::PolyHasher;

/// A canonical byte string handed out by an [`Interner`].
///
/// Two words from the same interner are equal exactly when they share storage, so equality is
/// a pointer comparison and never looks at the bytes. Comparing words from different interners
/// is meaningless.
#[derive(Clone)]
pub struct Word(Rc<[u8]>);

impl Word {
    pub fn as_bytes(&self) -> &[u8] { return &self.0; }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool { return Rc::ptr_eq(&self.0, &other.0); }
}

impl Eq for Word {}

impl Deref for Word {
    type Target = [u8];
    fn deref(&self) -> &[u8] { return &self.0; }
}

impl ChainKey for Word {
    fn feed(&self, hasher: &mut PolyHasher) { hasher.write(&self.0); }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{:?}", String::from_utf8_lossy(&self.0));
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&String::from_utf8_lossy(&self.0));
    }
}

/// A facility for deduplicating byte strings. Given a multiset of strings, [`Interner`]
/// hands out one shared [`Word`] per distinct string.
///
/// # Supported Operators
/// - [`Interner::intern`] returns the canonical word for `raw`, storing `raw` if it is new.
/// - [`Interner::get`] returns the canonical word for `raw` only if it was interned before.
///
/// # Runtime Complexity
/// Both operators hash `raw` once and compare it against the strings chained in one bucket,
/// so the average cost is `O(m)` where `m` is the length of `raw`.
pub struct Interner {
    table: ChainTable<Rc<[u8]>, ()>
}

impl Interner {
    pub fn new() -> Result<Self> { return Self::with_config(TableConfig::default()); }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        return Ok(Self { table: ChainTable::with_config(config)? });
    }

    pub fn intern(&mut self, raw: &[u8]) -> Result<Word> {
        if let Some(word) = self.get(raw) { return Ok(word); }
        let id = self.table.insert_new(Rc::from(raw), ())?;
        return Ok(Word(Rc::clone(self.table.key(id))));
    }

    pub fn get(&self, raw: &[u8]) -> Option<Word> {
        let id = self.table.lookup(raw)?;
        return Some(Word(Rc::clone(self.table.key(id))));
    }

    /// Number of distinct strings interned.
    pub fn len(&self) -> usize { return self.table.len(); }

    pub fn is_empty(&self) -> bool { return self.table.is_empty(); }
}
