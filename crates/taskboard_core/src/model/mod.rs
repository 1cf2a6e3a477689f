mod task;

pub use task::{NewTask, Priority, Task};
