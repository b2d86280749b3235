mod bits;
pub use bits::*;
