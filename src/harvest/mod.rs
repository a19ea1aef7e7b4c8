pub mod checkpoint;
pub mod orchestrator;
pub mod window;
