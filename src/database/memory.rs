use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::models::user::messages;
use crate::models::{
    CreateUsersResult, DeleteUsersResult, NewUser, UpdateUsersResult, User, UserUpdate,
};

struct Inner {
    users: Vec<User>,
    next_id: i64,
}

/// 内存用户存储
///
/// 所有读改写序列都在同一把写锁内完成，并发的批量操作不会丢失更新。
/// id 计数器只增不减，删除后的 id 不会被复用。
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// 预置一个演示用户 (id = 1)，计数器从 2 开始
    pub fn seeded() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: vec![User {
                    id: 1,
                    name: "Alice".to_string(),
                    email: "alice@example.com".to_string(),
                }],
                next_id: 2,
            }),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn get(&self, id: i64) -> Result<User, StoreError> {
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create_many(&self, inputs: Vec<NewUser>) -> Result<CreateUsersResult, StoreError> {
        let mut inner = self.inner.write().await;
        let mut result = CreateUsersResult::default();

        for input in inputs {
            if !input.is_complete() {
                result.errors.push(messages::FIELDS_REQUIRED.to_string());
                continue;
            }
            if inner.users.iter().any(|u| u.email == input.email) {
                result.errors.push(messages::EMAIL_EXISTS.to_string());
                continue;
            }

            let user = User {
                id: inner.next_id,
                name: input.name,
                email: input.email,
            };
            inner.next_id += 1;
            inner.users.push(user.clone());
            result.created.push(user);
        }

        tracing::debug!(
            created = result.created.len(),
            rejected = result.errors.len(),
            "memory store create_many"
        );
        Ok(result)
    }

    async fn update_many(
        &self,
        inputs: Vec<UserUpdate>,
    ) -> Result<UpdateUsersResult, StoreError> {
        let mut inner = self.inner.write().await;

        // 按整批执行后的 email 检查冲突，冲突时整批不生效
        {
            let mut final_emails: HashMap<i64, &str> = inner
                .users
                .iter()
                .map(|u| (u.id, u.email.as_str()))
                .collect();
            for input in inputs.iter().filter(|i| i.id > 0) {
                if let Some(email) = final_emails.get_mut(&input.id) {
                    *email = input.email.as_str();
                }
            }

            let mut seen = HashSet::with_capacity(final_emails.len());
            for email in final_emails.values() {
                if !seen.insert(*email) {
                    return Err(StoreError::Conflict(format!(
                        "{}: {}",
                        messages::EMAIL_EXISTS,
                        email
                    )));
                }
            }
        }

        let mut result = UpdateUsersResult::default();
        for input in inputs {
            if input.id <= 0 {
                result.not_found.push(input.id);
                continue;
            }
            match inner.users.iter_mut().find(|u| u.id == input.id) {
                Some(user) => {
                    user.name = input.name;
                    user.email = input.email;
                    result.updated.push(user.clone());
                }
                None => result.not_found.push(input.id),
            }
        }

        Ok(result)
    }

    async fn delete_many(&self, ids: Vec<i64>) -> Result<DeleteUsersResult, StoreError> {
        let mut inner = self.inner.write().await;

        let (removed, kept): (Vec<User>, Vec<User>) = std::mem::take(&mut inner.users)
            .into_iter()
            .partition(|u| ids.contains(&u.id));
        inner.users = kept;

        let deleted = removed.into_iter().map(|u| u.id).collect();
        Ok(DeleteUsersResult::from_requested(&ids, deleted))
    }
}
