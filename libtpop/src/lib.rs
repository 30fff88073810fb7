//! Containers and text tools from a tour of classic C exercises: an ordered container with tree
//! sort, a chained hash table that grows by occupied buckets, byte string interning and an
//! order-`N` Markov chain text generator.

pub mod error;
pub mod util;
pub mod tree;
pub mod quicksort;
pub mod table;
pub mod intern;
pub mod markov;
pub mod text;

pub use error::{Error, Result};
