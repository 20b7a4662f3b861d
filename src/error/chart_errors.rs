use either::{Either, Left};
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use super::MetricLabel;
use crate::SharedString;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to chart: {0}")]
    EmptySeries(String),

    #[error("failed to render chart: {0}")]
    Render(String),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}

impl MetricLabel for ChartError {
    fn slug(&self) -> SharedString {
        "chart".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::EmptySeries(_) => Left("empty_series".into()),
            Self::Render(_) => Left("render".into()),
            Self::IO(_) => Left("io".into()),
        }
    }
}

impl<E> From<DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(that: DrawingAreaErrorKind<E>) -> Self {
        Self::Render(that.to_string())
    }
}
