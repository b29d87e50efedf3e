pub mod abilities;
pub mod action_queue;
pub mod actions;
pub mod arbiter;
pub mod context;
pub mod damage;
pub mod engine;
pub mod field;
pub mod items;
pub mod move_execution;
pub mod pipeline;
pub mod steps;
pub mod triggers;
pub mod turn_order;
pub mod validation;

#[cfg(test)]
mod tests;
