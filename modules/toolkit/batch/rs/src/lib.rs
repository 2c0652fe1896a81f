pub use batch::{Batch, Request};
pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::BatchError;
pub use result::{Record, Results};

mod batch;
mod builder;
mod engine;
mod error;
mod result;
mod worker;
