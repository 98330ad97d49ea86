// Image blurring pipeline: load, detect, blur, write

pub mod blur;
pub mod detection;
pub mod face;
pub mod filter;
pub mod geometry;
pub mod orchestrator;
pub mod reader;
pub mod types;
pub mod writer;
