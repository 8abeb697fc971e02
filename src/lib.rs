pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{InMemoryPeriodStore, RestPeriodStore};
pub use core::context::{ContextSelector, ReadRepairPolicy};
pub use core::filter::{FilterBuilder, FilterColumns, FilterMode, QueryFilter};
pub use core::manager::PeriodManager;
pub use domain::model::{
    ContextSource, Intent, OutcomeCode, Period, PeriodContext, PeriodId, Record, Semester,
};
pub use domain::ports::{Clock, FixedClock, PeriodStore, SystemClock};
pub use utils::error::{PeriodError, Result};
