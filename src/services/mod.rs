pub mod advisory;
pub mod cwa;
pub mod normalizer;
pub mod prediction;
pub mod regions;
pub mod report;
