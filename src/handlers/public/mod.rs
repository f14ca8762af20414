// Public handlers: token acquisition and registration.
pub mod users;

pub use users::{login, signup};
