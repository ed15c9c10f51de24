//! CLI domain: parse, route, output, and presentation only.
//! No query logic; the route table dispatches to the query services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Collection, Commands, OutputFormat, QueryCommands};
pub use presentation::{
    format_aggregation_text, format_json, format_list_text, format_load_summary,
    format_submission_text,
};
pub use route::RunContext;
