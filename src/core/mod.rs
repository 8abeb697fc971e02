pub mod calendar;
pub mod context;
pub mod filter;
pub mod manager;
pub mod repair;
pub mod resolver;
pub mod transition;
pub mod validator;

pub use crate::domain::model::{Intent, Period, PeriodContext, PeriodId, Semester};
pub use crate::domain::ports::{Clock, ConfigProvider, PeriodStore};
pub use crate::utils::error::Result;
