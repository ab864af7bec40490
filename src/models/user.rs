use serde::{Deserialize, Serialize};

/// 对外暴露的用户模型（与数据库实体分离）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// 批量创建的单项输入，缺失字段按空字符串处理，由存储层逐项校验
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl NewUser {
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }
}

/// 批量更新的单项输入，id 缺失时为 0，视为不存在
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUsersRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateUsersResult {
    pub created: Vec<User>,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateUsersResult {
    pub updated: Vec<User>,
    pub not_found: Vec<i64>,
}

#[derive(Debug, Default, Serialize)]
pub struct DeleteUsersResult {
    pub deleted: Vec<i64>,
    pub not_found: Vec<i64>,
}

impl DeleteUsersResult {
    /// 根据请求的 id 与实际删除的 id 计算结果，not_found 去重并保持请求顺序
    pub fn from_requested(requested: &[i64], deleted: Vec<i64>) -> Self {
        let mut not_found: Vec<i64> = Vec::new();
        for id in requested {
            if !deleted.contains(id) && !not_found.contains(id) {
                not_found.push(*id);
            }
        }
        Self { deleted, not_found }
    }
}

pub mod messages {
    pub const FIELDS_REQUIRED: &str = "Name and Email are required";
    pub const EMAIL_EXISTS: &str = "Email already exists";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_missing_fields_deserialize_as_empty() {
        let input: NewUser = serde_json::from_str(r#"{"name":"Bob"}"#).unwrap();
        assert_eq!(input.name, "Bob");
        assert!(input.email.is_empty());
        assert!(!input.is_complete());
    }

    #[test]
    fn delete_result_partitions_requested_ids() {
        let result = DeleteUsersResult::from_requested(&[1, 5, 5, 3], vec![1, 3]);
        assert_eq!(result.deleted, vec![1, 3]);
        assert_eq!(result.not_found, vec![5]);
    }

    #[test]
    fn empty_results_serialize_as_empty_arrays() {
        let json = serde_json::to_value(UpdateUsersResult::default()).unwrap();
        assert_eq!(json, serde_json::json!({"updated": [], "not_found": []}));
    }
}
