//! Common re-exports for convenient entity usage.

pub use super::daily_activity::{
    ActiveModel as DailyActivityActiveModel, Column as DailyActivityColumn,
    Entity as DailyActivityEntity, Model as DailyActivityModel,
};
pub use super::top_repository::{
    ActiveModel as TopRepositoryActiveModel, Column as TopRepositoryColumn,
    Entity as TopRepository, Model as TopRepositoryModel,
};
