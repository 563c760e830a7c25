//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// Collection used when no override is configured
pub const DEFAULT_COLLECTION: &str = "users";

/// Stored shape of a user: flat, keyed by the native `_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: i64,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number,
        }
    }
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        Self {
            id: document.id,
            name: document.name,
            email: document.email,
            phone_number: document.phone_number,
        }
    }
}

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// Repository over the `users` collection of `db`
    ///
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(client.database("crud"));
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<UserDocument>(collection_name),
        }
    }

    fn by_id(id: &str) -> Document {
        doc! { "_id": id }
    }

    /// Field-level `$set` of everything except the key
    fn set_fields(user: &User) -> Document {
        doc! {
            "$set": {
                "name": user.name.as_str(),
                "email": user.email.as_str(),
                "phone_number": user.phone_number,
            }
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> UserResult<()> {
        self.collection.insert_one(UserDocument::from(user)).await?;

        tracing::info!(user_id = %user.id, "User inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> UserResult<User> {
        self.collection
            .find_one(Self::by_id(id))
            .await?
            .map(User::from)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> UserResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<UserDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> UserResult<()> {
        let result = self
            .collection
            .update_one(Self::by_id(&user.id), Self::set_fields(user))
            .await?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound(user.id.clone()));
        }

        tracing::info!(user_id = %user.id, "User updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> UserResult<()> {
        let result = self.collection.delete_one(Self::by_id(id)).await?;

        if result.deleted_count == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
