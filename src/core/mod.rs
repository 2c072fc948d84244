pub mod calendar;
pub mod etl;
pub mod interval;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod stats;

pub use crate::domain::model::{Cell, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
