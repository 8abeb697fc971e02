// Adapters layer: concrete PeriodStore backends.

pub mod memory;
pub mod rest;

pub use memory::InMemoryPeriodStore;
pub use rest::RestPeriodStore;
