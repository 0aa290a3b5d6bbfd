pub mod models;
pub mod feedback;
pub mod transcript;

pub use models::*;
pub use feedback::*;
pub use transcript::*;
