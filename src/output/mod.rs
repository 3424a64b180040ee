pub mod formatter;
pub mod reports;

pub use formatter::{
    format_date, format_gap, format_lap_time, format_points, render_table, render_tsv,
    should_use_colors, Column, Table,
};
pub use reports::*;
