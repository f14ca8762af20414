pub mod account;
pub mod category;
pub mod transaction;
pub mod user;

pub use account::Account;
pub use category::Category;
pub use transaction::{Transaction, TransactionType};
pub use user::User;
