mod change_channel;
mod component_monitor;
mod gather_strategy;
mod reactive_gather_strategy;

pub use change_channel::{ChangeBuffer, ChangeChannel, ChangeReceiver, ChangeSender};
pub use component_monitor::{ComponentMonitor, ComponentMonitorDyn};
pub use gather_strategy::{GatherPause, GatherStrategy};
pub use reactive_gather_strategy::ReactiveGatherStrategy;
