pub use rivet_core::*;
