// handlers/protected/mod.rs - endpoints behind jwt_auth_middleware
//
// Every handler takes the `AuthUser` extractor. Order inside a handler:
// validate inputs → load record → authorize owner → mutate.

pub mod comment;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod video;
