// Protected handlers: every route here sits behind jwt_auth_middleware and
// takes the caller's AuthUser explicitly.
pub mod accounts;
pub mod categories;
pub mod transactions;
pub mod users;
