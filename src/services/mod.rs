pub mod account_service;
pub mod category_service;
pub mod error;
pub mod transaction_service;
pub mod user_service;

pub use account_service::AccountService;
pub use category_service::CategoryService;
pub use error::{ServiceError, ServiceResult};
pub use transaction_service::TransactionService;
pub use user_service::UserService;
