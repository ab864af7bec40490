/// 用户缓存键前缀
const USER_PREFIX: &str = "user:";

/// 生成用户缓存键，例如 `user:42`
pub fn user_key(id: i64) -> String {
    format!("{}{}", USER_PREFIX, id)
}
