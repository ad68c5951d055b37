//! Value types shared by the engine adapters.

pub mod format_selector;

pub use format_selector::QualityProfile;
