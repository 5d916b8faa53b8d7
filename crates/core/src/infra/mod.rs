pub mod assessment;
pub mod audio;
pub mod feedback;
pub mod metrics;
pub mod storage;
pub mod transcript;
