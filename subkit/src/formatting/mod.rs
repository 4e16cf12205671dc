//! Terminal formatting shared by every command.
//!
//! Colors, symbols and table styles live here so commands only decide what
//! to print.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, print_section_header_with_subtitle, SectionStyle};
pub use output::{print_key_value, print_separator_with_spacing, print_summary_box};
pub use status::{print_error, print_info, print_success, print_warning, Status};
pub use tables::{
    print_alternatives_table, print_census_table, print_conflict_table, print_outcome_table,
};
