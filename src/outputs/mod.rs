//! Report outputs.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`Report`](crate::models::Report) as a JSON file
//! - [`text`]: renders the human-readable summary printed at the end of a run
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── morning.json
//!     ├── afternoon.json
//!     └── evening.json
//!
//! images/
//! ├── ABCDEF.jpg
//! └── ...
//! ```

pub mod json;
pub mod text;
