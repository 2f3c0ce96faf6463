//! Files written by a run.
//!
//! # Submodules
//!
//! - [`json`]: the per-topic article sets the front end loads (also read back
//!   at the start of a run)
//! - [`snapshots`]: optional timestamped copies of what a run fetched
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── ai.json
//! ├── prehistory.json
//! └── uap.json
//!
//! snapshot_dir/            # only with --snapshot-dir
//! ├── ai_2025-05-06_08-00-01.json
//! └── news_2025-05-06_08-00-01.json
//! ```

pub mod json;
pub mod snapshots;
