use rand::Rng;
use tracing::trace;
use crate::error::Result;
use crate::intern::{Interner, Word};
use crate::table::{ChainTable, EntryId, TableConfig};
use crate::util::arena::{Arena, Handle, LLNode, iter_ll, push_front_ll};

/// Number of words in a prefix used by the text generator.
pub const NPREF: usize = 2;

/// Bucket count of a model's state table unless configured otherwise.
pub const DEFAULT_STATE_BUCKETS: usize = 10240;

type SuffixId = Handle<LLNode<Word>>;

/// The words observed after one prefix, most recent first. Duplicates are kept, so a word
/// that followed the prefix twice is twice as likely to be sampled.
#[derive(Default, Debug)]
pub struct State {
    suffixes: Option<SuffixId>,
    count: usize
}

pub type StateId<const N: usize> = EntryId<[Word; N], State>;

/// An order-`N` Markov chain over interned words.
///
/// Prefixes are ordered tuples: `(a, b)` and `(b, a)` are different states. Words are compared
/// by identity, so every word given to one model must come from the same [`Interner`].
pub struct MarkovModel<const N: usize> {
    states: ChainTable<[Word; N], State>,
    suffixes: Arena<LLNode<Word>>
}

impl<const N: usize> MarkovModel<N> {
    pub fn new() -> Result<Self> {
        let config = TableConfig::default().with_initial_buckets(DEFAULT_STATE_BUCKETS);
        return Self::with_config(config);
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        assert!(N > 0, "a Markov prefix needs at least one word");
        return Ok(Self { states: ChainTable::with_config(config)?, suffixes: Arena::new() });
    }

    /// Records that `next` followed `prefix`.
    pub fn observe(&mut self, prefix: [Word; N], next: Word) -> Result<()> {
        self.suffixes.reserve(1)?;
        let before = self.states.len();
        let id = self.states.lookup_or_insert_with(prefix, State::default)?;
        if self.states.len() > before {
            trace!(states = self.states.len(), "created Markov state");
        }
        let state = self.states.value_mut(id);
        push_front_ll(&mut self.suffixes, &mut state.suffixes, next)?;
        state.count += 1;
        return Ok(());
    }

    pub fn state(&self, prefix: &[Word; N]) -> Option<StateId<N>> {
        return self.states.lookup(prefix);
    }

    pub fn prefix(&self, state: StateId<N>) -> &[Word; N] { return self.states.key(state); }

    pub fn suffixes(&self, state: StateId<N>) -> impl Iterator<Item = &Word> + '_ {
        let head = self.states.value(state).suffixes;
        return iter_ll(&self.suffixes, head).map(|(_, word)| word);
    }

    pub fn suffix_count(&self, state: StateId<N>) -> usize {
        return self.states.value(state).count;
    }

    /// Number of distinct prefixes observed.
    pub fn len(&self) -> usize { return self.states.len(); }

    pub fn is_empty(&self) -> bool { return self.states.is_empty(); }

    /// Picks one of the suffixes of `state` uniformly at random, counting duplicates.
    pub fn sample_suffix<R: Rng>(&self, state: StateId<N>, rng: &mut R) -> Option<Word> {
        return reservoir_sample(self.suffixes(state), rng).cloned();
    }

    /// Picks a random occupied bucket of the state table and then a random prefix chained in
    /// that bucket. Prefixes sharing a bucket are therefore less likely than prefixes alone in
    /// theirs. Returns `None` for an empty model.
    pub fn sample_initial_prefix<R: Rng>(&self, rng: &mut R) -> Option<[Word; N]> {
        let occupied = self.states.occupied_slots();
        if occupied == 0 { return None; }
        let bucket = self.states.nth_occupied_bucket(rng.gen_range(0..occupied))?;
        let (_, entry) = reservoir_sample(self.states.chain(bucket), rng)?;
        return Some(entry.key.clone());
    }

    /// Generates up to `count` words. The output starts with a random initial prefix, which is
    /// emitted whole even when `count < N`, and ends early at a prefix nothing ever followed.
    pub fn generate<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Word> {
        let Some(mut window) = self.sample_initial_prefix(rng) else { return Vec::new(); };
        let mut words = window.to_vec();
        while words.len() < count {
            let Some(next) = self.state(&window).and_then(|state| self.sample_suffix(state, rng))
                else { break; };
            window.rotate_left(1);
            window[N - 1] = next.clone();
            words.push(next);
        }
        return words;
    }
}

/// Selects one item uniformly at random in a single pass: the `k`th item replaces the held
/// candidate with probability `1/k`.
pub fn reservoir_sample<I, R>(items: I, rng: &mut R) -> Option<I::Item>
where
    I: IntoIterator,
    R: Rng
{
    let mut chosen = None;
    for (seen, item) in items.into_iter().enumerate() {
        if rng.gen_range(0..=seen) == 0 {
            chosen = Some(item);
        }
    }
    return chosen;
}

// -- Trainer ------------------------------------------------------------------------------------

/// Feeds a stream of raw words into a [`MarkovModel`], interning each one and sliding an
/// `N`-word window over the stream. The first `N` words only fill the window.
pub struct Trainer<const N: usize> {
    interner: Interner,
    model: MarkovModel<N>,
    window: Vec<Word>
}

impl<const N: usize> Trainer<N> {
    pub fn new(interner: Interner, model: MarkovModel<N>) -> Self {
        return Self { interner, model, window: Vec::with_capacity(N) };
    }

    pub fn feed(&mut self, raw: &[u8]) -> Result<()> {
        let word = self.interner.intern(raw)?;
        if self.window.len() == N {
            let prefix: [Word; N] = std::array::from_fn(|i| self.window[i].clone());
            self.model.observe(prefix, word.clone())?;
            self.window.remove(0);
        }
        self.window.push(word);
        return Ok(());
    }

    pub fn model(&self) -> &MarkovModel<N> { return &self.model; }

    pub fn interner(&self) -> &Interner { return &self.interner; }

    pub fn into_parts(self) -> (Interner, MarkovModel<N>) { return (self.interner, self.model); }
}
