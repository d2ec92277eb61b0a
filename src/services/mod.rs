pub mod agent;
pub mod database;
pub mod executor;
pub mod export;
pub mod planner;
pub mod retrieval;
