pub mod error;
pub mod smoother;
