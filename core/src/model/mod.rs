pub mod collection;
pub mod task;
