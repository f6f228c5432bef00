//! File export.

pub mod export;

pub use export::{
    export_csv, export_json, export_schedule_csv, export_step_table_csv, write_step_table_csv,
};
