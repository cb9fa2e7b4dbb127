pub mod docker;
pub mod filter;
pub mod ps;
pub mod stabilize;

pub use docker::{DockerProcessSource, ProcessSource};
pub use filter::{filter_rows, RowFilter};
pub use ps::{output_lines, parse_ps_output, PS_ARGS};
pub use stabilize::{snapshot_tree, wait_for_process_count, RetryPolicy};
