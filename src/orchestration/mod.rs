//! Multi-aggregate workflows. The only stateful operations in the crate.

pub mod assignment;

pub use assignment::{
    preview_for, AssignmentError, AssignmentOrchestrator, AssignmentOutcome, AssignmentPreview,
    CompleteAssignment,
};
