pub mod arena;
pub mod ascii;
pub mod bits;
#[cfg(test)]
pub(crate) mod misc;
