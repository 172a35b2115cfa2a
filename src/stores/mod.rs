pub mod pool;
pub mod schema;
pub mod user_store;

#[cfg(test)]
pub mod memory_store;
