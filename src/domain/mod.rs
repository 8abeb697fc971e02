// Domain layer: period model and ports. Services live under `core`.

pub mod model;
pub mod ports;
