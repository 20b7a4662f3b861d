pub mod charts;
pub mod elements;
pub mod error;
pub mod phases;
pub mod settings;
pub mod tracing;

pub use error::BenchvizError;

pub type BenchvizResult<T> = Result<T, error::BenchvizError>;

pub type SharedString = std::borrow::Cow<'static, str>;
