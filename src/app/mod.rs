pub mod commands;
pub mod context;
pub mod errors;
pub mod pipeline;
pub mod remote;
pub mod sync;

pub use context::AppContext;
pub use errors::AppError;
