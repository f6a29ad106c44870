// Library root
// -----------
// The binary (`main.rs`) parses the command line, builds a `ScanConfig`
// and hands it to `pipeline::run` together with a `MobsfClient`.
//
// Module responsibilities:
// - `cli`: clap argument surface.
// - `config`: immutable run configuration resolved from the CLI.
// - `api`: the `ScanService` trait and its blocking HTTP implementation.
// - `report`: writers for the JSON and PDF reports.
// - `pipeline`: upload, static branch, dynamic branch.
// - `ui`: console status lines and spinners.
// - `error`: error types for the above.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod ui;
