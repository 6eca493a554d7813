//! Data sources other than user input.

pub mod sample;

pub use sample::{ListingSample, SampleConfig, generate_listings, write_sample_csv};
