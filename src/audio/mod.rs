//! WAV file boundary of the toolkit. Everything past this module works on
//! normalized `f64` samples in `[-1, 1]`.

pub mod wav;

pub use wav::{load, save};
