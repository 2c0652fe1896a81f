pub use config::Config;
pub use scoring::Penalties;
pub use script::{EditScript, Op, Step};
pub use wfa::{Aligner, Alignment, Status};

pub mod config;
pub mod scoring;
pub mod script;
pub mod wfa;
