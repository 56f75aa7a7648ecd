//! Repository layer for data access.

pub mod entities;
pub mod gateway;
mod user_repository;

pub use gateway::{EntityGateway, PatchError};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
