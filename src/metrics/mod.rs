pub mod classifier;
pub mod pace;

pub use pace::compute_metrics;
