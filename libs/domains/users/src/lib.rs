//! Users Domain
//!
//! CRUD for a single user resource stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, error → status mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, id generation, partial-update merge
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Port (trait) + in-memory and MongoDB adapters
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Aggregate, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, MongoUserRepository, UserService};
//! use mongodb::Client;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoUserRepository::new(client.database("crud"));
//! let service = UserService::new(repository);
//!
//! let router = handlers::router(service, CancellationToken::new());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod id;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use id::{IdGenerator, sequential_generator, uuid_generator};
pub use models::{CreateUser, UpdateUser, User, UserResponse};
pub use mongodb::{MongoUserRepository, UserDocument};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
