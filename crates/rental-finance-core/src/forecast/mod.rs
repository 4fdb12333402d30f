//! Multi-year investment projection and break-even occupancy analytics.

pub mod breakeven;
pub mod projection;
