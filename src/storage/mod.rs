pub mod database;

pub use database::{
    ConversationDetail, ConversationSummary, Database, PoolConfig, SharedDatabase,
};
