//! # CLI Module
//!
//! Command-line access to the dispatcher, backed by the demo `test` resource.
//!
//! ## Commands
//!
//! ### `request`
//!
//! Dispatch one request and print status, headers and body:
//!
//! ```bash
//! brrtrest request GET /rest/test/3 -H 'Accept: application/json'
//! brrtrest request GET /rest/test.csv
//! brrtrest request POST /rest/test \
//!     -H 'Content-Type: application/x-www-form-urlencoded' \
//!     --body 'title=ten&author=Ann'
//! ```
//!
//! ### `types`
//!
//! List the content table with content, method and exec capability
//! identifiers under the configured prefixes:
//!
//! ```bash
//! brrtrest types --config config/config.yaml
//! ```
//!
//! Both commands read `--config` (or `BRRTREST_CONFIG`) and then the
//! `BRRTREST_*` environment overrides. Logs go to stderr, see
//! [`crate::logging`].

mod commands;


pub use commands::{execute, run_cli, write_response, Cli, Commands};
