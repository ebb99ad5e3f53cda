//! 消息模块 - 进程内广播总线
//!
//! 引擎在每次可观察的状态变更后向总线发布事件；
//! 订阅者（WebSocket 网关、测试）各自持有一个接收端。

pub mod bus;

pub use bus::{BusConfig, MessageBus};
pub use shared::message::{BusMessage, EventType};
