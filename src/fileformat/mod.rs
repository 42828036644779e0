pub mod per_sample_counts;
pub mod report;
pub mod sample_map;

pub use per_sample_counts::read_per_sample_counts;
pub use per_sample_counts::read_per_sample_counts_file;
pub use per_sample_counts::SampleCount;
pub use per_sample_counts::DEFAULT_COUNT_COLUMN;

pub use sample_map::SampleMap;

pub use report::ReportSink;
pub use report::ReportWriter;
