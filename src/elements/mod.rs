mod benchmark_row;
mod thread_sample;

pub use benchmark_row::*;
pub use thread_sample::*;

pub type Point = (f64, f64);
