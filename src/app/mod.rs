// Application boundary: ports the pipeline drives

pub mod ports;
