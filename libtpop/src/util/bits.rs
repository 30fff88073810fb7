/// The multiplier used by [`PolyHasher`] unless configured otherwise. Works well for ASCII text.
pub const DEFAULT_MULTIPLIER: usize = 37;

/// Fast but insecure polynomial hash over a byte sequence. Each byte folds into the state as
/// `h = h * h * multiplier + byte` with wrapping arithmetic.
///
/// Several writes hash the same as one write of their concatenation.
#[derive(Clone, Copy, Debug)]
pub struct PolyHasher { state: usize, multiplier: usize }

impl PolyHasher {
    pub fn new(multiplier: usize) -> Self {
        return Self { state: 0, multiplier };
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state = self.state.wrapping_mul(self.state)
                .wrapping_mul(self.multiplier)
                .wrapping_add(usize::from(*byte));
        }
    }

    pub fn finish(self) -> usize { return self.state; }
}

pub fn poly_hash(s: &[u8], multiplier: usize) -> usize {
    let mut hasher = PolyHasher::new(multiplier);
    hasher.write(s);
    return hasher.finish();
}
