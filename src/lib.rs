// Library exports for reuse by front ends and other applications
pub mod cli;
pub mod config_file;
pub mod image_processing;
pub mod json_output;
pub mod utils;

// Re-export commonly used types
pub use cli::{Algorithm, Args, OutputNaming};
pub use image_processing::{
    run_batch, BatchConfig, BatchError, BatchOutcome, BatchRunner, BatchSummary, Enhancement,
    Enhancer, InputSpec, NamingPolicy, TileGrid,
};
pub use json_output::JsonMessage;
