// Domain layer: cart and tax models plus the ports the core depends on.

pub mod model;
pub mod ports;
