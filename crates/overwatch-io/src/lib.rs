//! # overwatch-io: Feeder Data Persistence
//!
//! File formats around the fault-location engine. Everything here sits at the
//! I/O boundary and reports failures through `anyhow` with the offending path in
//! the context chain.
//!
//! | Module | File | Format |
//! |--------|------|--------|
//! | [`config`] | feeder description | TOML, `[base]` `[source]` `[line]` `[feeder]` |
//! | [`table_store`] | reference tables | CSV `distance_km,ia,ib,ic,fault_type` |
//! | [`frame`] | sensor snapshot | CSV `ia,ib,ic`, one row per unit |
//! | [`report`] | Monte Carlo trials | CSV, one row per trial |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use overwatch_io::{load_feeder_config, load_reference_tables, load_sensor_frame};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = load_feeder_config("feeder.toml")?;
//!     let tables = load_reference_tables("tables.csv")?;
//!     let frame = load_sensor_frame("frame.csv")?;
//!     let result = overwatch_algo::locate(&frame, &tables, &config)?;
//!     println!("{}: {:.2} km", result.label(), result.distance_km);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod frame;
pub mod report;
pub mod table_store;

pub use config::{load_feeder_config, FeederSettings};
pub use frame::{load_sensor_frame, write_sensor_frame};
pub use report::write_trial_report;
pub use table_store::{load_reference_tables, save_reference_tables, TableFormatError};
