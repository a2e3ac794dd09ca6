use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Errors raised by the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver-level parse failure.
        #[source]
        source: MongoError,
    },
    /// The driver client could not be constructed.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver-level construction failure.
        #[source]
        source: MongoError,
    },
    /// The database never answered the initial ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of ping attempts made.
        attempts: u32,
        /// Last ping failure.
        #[source]
        source: MongoError,
    },
    /// A routine health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver-level ping failure.
        #[source]
        source: MongoError,
    },
    /// Index creation failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Name of the index.
        index: &'static str,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// A game document could not be written.
    #[error("failed to save game `{id}`")]
    SaveGame {
        /// Game primary key.
        id: Uuid,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// A game document could not be read.
    #[error("failed to load game `{id}`")]
    LoadGame {
        /// Game primary key.
        id: Uuid,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// The game listing query failed.
    #[error("failed to list games")]
    ListGames {
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// A question bank lookup failed.
    #[error("failed to load question {question_id} (category {category_id}, difficulty {difficulty})")]
    LoadQuestion {
        /// Question identifier.
        question_id: u32,
        /// Category identifier.
        category_id: u32,
        /// Difficulty level.
        difficulty: u8,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// The settings document could not be read.
    #[error("failed to load game settings")]
    LoadSettings {
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
}
