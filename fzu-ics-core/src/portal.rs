//! 教务系统访问抽象
//!
//! [`Portal`] 负责建立会话：要么用学号口令做完整登录，要么用缓存的
//! 身份标识和 Cookie 做轻量续期。[`PortalHandle`] 是一次请求内独占的
//! 活动会话，用于拉取讲座列表和导出可缓存的会话数据。

pub mod jwch;

use async_trait::async_trait;

use crate::{
    Result,
    types::{Cookie, Credentials, Lecture},
};

/// 教务系统客户端
#[async_trait]
pub trait Portal: Send + Sync {
    /// 活动会话句柄类型
    type Handle: PortalHandle;

    /// 用学号口令做完整登录
    async fn login(&self, credentials: &Credentials) -> Result<Self::Handle>;

    /// 用缓存的身份标识和 Cookie 续期会话
    ///
    /// 只做一次轻量校验，不重新提交口令。失败由调用方回退到完整登录。
    async fn resume(&self, identity: &str, cookies: &[Cookie]) -> Result<Self::Handle>;
}

/// 活动会话句柄
#[async_trait]
pub trait PortalHandle: Send + Sync {
    /// 拉取当前用户的讲座列表
    async fn lectures(&self) -> Result<Vec<Lecture>>;

    /// 导出身份标识与 Cookie 供缓存复用
    fn export_session(&self) -> Result<(String, Vec<Cookie>)>;
}
