pub mod id_allocator;
pub mod task_service;
