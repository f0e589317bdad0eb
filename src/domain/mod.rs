// Domain layer: catalog entities and the client port the migrator talks to.

pub mod model;
pub mod ports;
