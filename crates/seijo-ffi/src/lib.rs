pub mod ffi;
pub mod marshal;
pub mod result;

// Re-export the C-ABI surface so consumers can reference the type directly.
pub use result::SeijoResult;
