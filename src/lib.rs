pub mod api;
pub mod commas;
pub mod comment;
pub mod config;
pub mod derived_join;
pub mod error;
pub mod formatter;
pub mod join_on;
pub mod line;
pub mod mode;
pub mod report;
pub mod select_top;
pub mod semicolon;
pub mod statements;

// Re-export the main public API
pub use api::{format_string, get_matching_paths, run};
pub use commas::{to_leading_commas, to_trailing_commas, CommaPosition};
pub use comment::{toggle_block_comment, toggle_line_comments};
pub use config::load_config;
pub use derived_join::format_derived_join_blocks;
pub use error::SqlbenchError;
pub use formatter::{format_sql_all, SqlFormatter};
pub use join_on::format_join_on_only;
pub use mode::{FormatOptions, Mode};
pub use select_top::merge_select_top;
pub use semicolon::move_semicolon_to_own_line;
pub use statements::split_sql_statements;
