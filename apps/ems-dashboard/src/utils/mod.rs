//! 工具函数模块

pub mod response;
pub mod validation;

pub use response::*;
pub use validation::*;
