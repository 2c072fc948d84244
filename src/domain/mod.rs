// Domain layer: table model and ports (storage, configuration, pipeline).

pub mod model;
pub mod ports;
