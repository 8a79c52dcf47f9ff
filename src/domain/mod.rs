// Domain layer: order models and ports (interfaces) for the spreadsheet and the order form.

pub mod model;
pub mod ports;
