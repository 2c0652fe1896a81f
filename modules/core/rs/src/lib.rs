pub mod num;
pub mod parallelism;
