use sqlx::FromRow;

use crate::models::User;

/// 用户数据库实体
#[derive(Debug, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        User {
            id: entity.id,
            name: entity.name,
            email: entity.email,
        }
    }
}
