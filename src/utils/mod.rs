pub mod encoding;
pub mod int_vec;

pub use encoding::*;
pub use int_vec::{bits_for, IntVector};
