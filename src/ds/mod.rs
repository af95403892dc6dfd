pub mod key_list;
pub mod touch_queue;

pub use key_list::{KeyList, NodeId};
pub use touch_queue::TouchQueue;
