pub mod application_workflow;
pub mod candidate_service;
pub mod candidate_store;
pub mod memory_store;
pub mod pg_store;
pub mod workflow_notifier;
