//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs. Each returns the process exit code.

mod inventory;
mod output;

pub use inventory::{load_index, run_manifest, run_sbom, run_scan};
pub use output::{render_inventory, write_output, OutputTarget};
