pub mod session;
pub mod types;

pub use session::{EditSession, SessionError};
pub use types::{MutateRequest, Mutation, MutationResponse, MutationResult};
