// handlers/mod.rs - two security tiers
//
// public:    no authentication (/api/v1/users/signup, /api/v1/users/login)
// protected: bearer token required, identity arrives as an AuthUser extractor
pub mod health;
pub mod protected;
pub mod public;
