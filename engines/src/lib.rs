#![doc = include_str!("../README.md")]

pub mod error;
pub mod executor;
pub mod fetcher;
pub mod model;
pub mod muxer;
pub mod utils;

pub use fetcher::{FetchEngine, FetchRequest, YtDlp};
pub use model::QualityProfile;
pub use muxer::{Ffmpeg, MuxEngine};
