//! 阈值告警：规则评估、恢复与定时轮询。
//!
//! - [`AlertEvaluator`]：单条规则的打开/关闭状态机
//! - [`AlertService`]：规则增删改，变更后立即评估
//! - [`AlertPoller`]：按固定间隔评估全部启用规则

pub mod clock;
pub mod error;
pub mod evaluator;
pub mod poller;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AlertError;
pub use evaluator::{AlertEvaluator, Evaluation, condition_holds};
pub use poller::AlertPoller;
pub use service::{AlertService, PollSummary};
