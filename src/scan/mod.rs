pub mod batch;
pub mod flatten;
pub mod pipeline;
