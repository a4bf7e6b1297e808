pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use connection::{connect, connect_with_settings, DbPool};
pub use repositories::{
    ConnectorRepository, ConversationRepository, InMemoryConnectorRepository,
    InMemoryConversationRepository, RepositoryError, SqlConnectorRepository,
    SqlConversationRepository,
};
pub use store::{ChangeHub, ChangeNotice, ConversationSubscription, MessageStore};
