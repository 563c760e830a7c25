use core_config::{FromEnv, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_users::mongodb::DEFAULT_COLLECTION;

pub use core_config::Environment;

/// Application configuration
/// Composes shared config components from the `config` and `database` libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    /// `USERS_COLLECTION`, defaults to `users`
    pub users_collection: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let mongodb = MongoConfig::from_env()?.with_app_name("users-api");
        let users_collection = env_or_default("USERS_COLLECTION", DEFAULT_COLLECTION);

        Ok(Self {
            environment,
            server,
            mongodb,
            users_collection,
        })
    }
}
