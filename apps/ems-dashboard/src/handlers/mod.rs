//! Handlers 模块

pub mod alerts;
pub mod events;
pub mod health;
pub mod meters;
pub mod metrics;
pub mod transfer;

pub use alerts::*;
pub use events::*;
pub use health::*;
pub use meters::*;
pub use metrics::*;
pub use transfer::*;
