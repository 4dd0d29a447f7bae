//! 进程级会话缓存
//!
//! 所有请求共享一份缓存，按学号存取最近一次完整登录导出的会话。
//! 条目没有过期时间，进程重启即清空；同一学号并发登录时后写覆盖，
//! 读取方不会看到半写入的条目。

use std::{collections::HashMap, sync::RwLock};

use bcrypt::DEFAULT_COST;

use crate::{Result, types::Session};

/// 对口令做加盐哈希，结果可直接存入缓存
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, DEFAULT_COST)?)
}

/// 校验口令与缓存哈希是否一致
///
/// bcrypt 内部做恒定时间比较；哈希格式异常一律视为不匹配。
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// 会话缓存
pub struct SessionStore {
    entries: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 查询学号对应的缓存会话
    pub fn get(&self, user_id: &str) -> Option<Session> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(user_id)
            .cloned()
    }

    /// 写入或覆盖学号对应的会话
    pub fn insert(&self, user_id: impl Into<String>, session: Session) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id.into(), session);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
