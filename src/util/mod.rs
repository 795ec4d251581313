//! Small presentation helpers shared by callers of the pipeline.

pub mod dates;
