use std::marker::PhantomData;
use std::num::NonZeroU32;
use crate::error::{Error, Result};

// -- Handle -------------------------------------------------------------------------------------

/// A 32-bit reference to a value stored in an [`Arena`]. Handles are only meaningful for the
/// arena that produced them.
#[repr(transparent)]
pub struct Handle<T> {
    key: NonZeroU32,
    pd: PhantomData<fn() -> T>
}

impl<T> Handle<T> {
    pub(crate) fn index(self) -> usize { return (self.key.get() - 1) as usize; }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self { return *self; }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool { return self.key == other.key; }
}

impl<T> Eq for Handle<T> {}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.key)
    }
}

// -- Arena --------------------------------------------------------------------------------------

/// Growable storage for the nodes of a linked structure. Nodes refer to one another through
/// [`Handle`]s instead of pointers, so no structure in this crate needs native recursion to be
/// walked or released.
///
/// Values are never removed individually. Dropping the arena drops every value in allocation
/// order.
pub struct Arena<T> { slots: Vec<T> }

impl<T> Default for Arena<T> {
    fn default() -> Self { return Self { slots: Vec::new() }; }
}

impl<T> Arena<T> {
    pub fn new() -> Self { return Self::default(); }

    /// Allocates an arena with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut arena = Self::new();
        arena.reserve(capacity)?;
        return Ok(arena);
    }

    /// Makes room for `additional` more values so that the next `additional` calls to
    /// [`Arena::alloc`] cannot fail for lack of memory.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.slots.try_reserve(additional)?;
        return Ok(());
    }

    /// Moves `value` into the arena and returns a [`Handle`] to it.
    ///
    /// On failure the arena is left untouched and `value` is dropped.
    pub fn alloc(&mut self, value: T) -> Result<Handle<T>> {
        let key = u32::try_from(self.slots.len() + 1).ok()
            .and_then(NonZeroU32::new)
            .ok_or(Error::CapacityOverflow)?;
        self.slots.try_reserve(1)?;
        self.slots.push(value);
        return Ok(Handle { key, pd: PhantomData });
    }

    pub fn get(&self, handle: Handle<T>) -> &T { return &self.slots[handle.index()]; }

    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        return &mut self.slots[handle.index()];
    }

    pub fn len(&self) -> usize { return self.slots.len(); }

    pub fn is_empty(&self) -> bool { return self.slots.is_empty(); }

    /// Consumes the arena, returning every value in allocation order. The value behind a handle
    /// `h` ends up at position `h.index()`.
    pub fn into_values(self) -> Vec<T> { return self.slots; }
}

// -- Linked List Support ------------------------------------------------------------------------

pub struct LLNode<T> {
    pub value: T,
    pub next: Option<Handle<Self>>
}

/// Links a new node holding `value` in front of the list starting at `head` and makes it the
/// new head. On allocation failure the list is unchanged.
pub fn push_front_ll<T>(mem: &mut Arena<LLNode<T>>, head: &mut Option<Handle<LLNode<T>>>,
    value: T) -> Result<Handle<LLNode<T>>>
{
    let handle = mem.alloc(LLNode { value, next: *head })?;
    *head = Some(handle);
    return Ok(handle);
}

/// Walks the list starting at `head`, yielding each node's handle and value.
pub fn iter_ll<T>(mem: &Arena<LLNode<T>>, head: Option<Handle<LLNode<T>>>) -> LLIter<'_, T> {
    return LLIter { mem, next: head };
}

pub struct LLIter<'a, T> {
    mem: &'a Arena<LLNode<T>>,
    next: Option<Handle<LLNode<T>>>
}

impl<'a, T> Iterator for LLIter<'a, T> {
    type Item = (Handle<LLNode<T>>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        let node = self.mem.get(handle);
        self.next = node.next;
        return Some((handle, &node.value));
    }
}
