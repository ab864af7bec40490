// 数据库模块
// 用户记录存储的统一抽象，以及内存与 PostgreSQL 两种实现

pub mod memory;
pub mod models;
pub mod repositories;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CreateUsersResult, DeleteUsersResult, NewUser, UpdateUsersResult, User, UserUpdate,
};

pub use memory::MemoryUserStore;
pub use models::user::UserEntity;
pub use repositories::user::PgUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 用户记录存储
///
/// 批量操作按项报告结果：单项失败不会使整个请求失败。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 按 id 升序返回全部用户
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, id: i64) -> Result<User, StoreError>;

    async fn create_many(&self, inputs: Vec<NewUser>) -> Result<CreateUsersResult, StoreError>;

    /// 更新 name 与 email，id 不变；若新 email 与其他用户冲突则整批不生效
    async fn update_many(&self, inputs: Vec<UserUpdate>)
    -> Result<UpdateUsersResult, StoreError>;

    async fn delete_many(&self, ids: Vec<i64>) -> Result<DeleteUsersResult, StoreError>;
}
