pub mod allocator;
pub mod attitude;
pub mod controller;

pub use allocator::{allocate, Allocation, AllocationInput};
pub use attitude::AttitudeController;
pub use controller::{AttitudeOutput, Completion, Controller};
