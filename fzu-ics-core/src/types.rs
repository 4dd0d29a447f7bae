use serde::{Deserialize, Serialize};

/// 用户凭据
///
/// 明文口令只在单次请求内存在，缓存中仅保存其 bcrypt 哈希。
#[derive(Debug, Clone)]
pub struct Credentials {
    /// 学号
    pub user_id: String,
    /// 教务系统口令
    pub password: String,
}

/// 教务系统会话 Cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 缓存的会话条目
///
/// 记录一次完整登录导出的身份标识与 Cookie，以及建立该会话时
/// 所用口令的哈希。口令本身永不落入缓存。
#[derive(Debug, Clone)]
pub struct Session {
    /// 教务系统身份标识
    pub identity: String,
    /// 会话 Cookie，保持服务端返回顺序
    pub cookies: Vec<Cookie>,
    /// 建立会话所用口令的 bcrypt 哈希
    pub password_hash: String,
}

/// 讲座信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    /// 讲座类别
    pub category: String,
    /// 期号
    pub issue_number: i64,
    /// 讲座标题
    pub title: String,
    /// 主讲人
    pub speaker: String,
    /// 听取情况
    pub attendance_status: String,
    /// 地点
    pub location: String,
    /// 开始时间（毫秒时间戳）
    pub timestamp_millis: i64,
}

/// ICS生成选项
#[derive(Debug, Clone)]
pub struct IcsOptions {
    /// 日历名称
    pub calendar_name: Option<String>,
    /// 提前提醒分钟数
    pub reminder_minutes: Option<u32>,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            calendar_name: Some("福州大学讲座".to_string()),
            reminder_minutes: Some(15),
        }
    }
}
