//! 登录编排
//!
//! 缓存命中且口令校验通过时走会话续期的快路径，其余情况一律回退到
//! 完整登录。缓存只是建议性的：口令哈希不匹配不是错误，真正的
//! 授权判定始终交给教务系统本身。

use std::sync::Arc;

use crate::{
    Error, Result,
    portal::{Portal, PortalHandle},
    session::{SessionStore, hash_password, verify_password},
    types::{Credentials, Session},
};

/// 登录编排器
pub struct Authenticator<P: Portal> {
    portal: P,
    store: Arc<SessionStore>,
}

impl<P: Portal> Authenticator<P> {
    pub fn new(portal: P, store: Arc<SessionStore>) -> Self {
        Self { portal, store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// 建立教务系统会话
    ///
    /// 完整登录成功后会覆盖缓存条目；失败以 [`Error::Authentication`]
    /// 上抛，由调用方转成凭据错误而非服务端故障。
    pub async fn login(&self, credentials: &Credentials) -> Result<P::Handle> {
        if let Some(cached) = self.store.get(&credentials.user_id) {
            if verify_password(&credentials.password, &cached.password_hash) {
                match self.portal.resume(&cached.identity, &cached.cookies).await {
                    Ok(handle) => {
                        tracing::debug!(user = %credentials.user_id, "reusing cached session");
                        return Ok(handle);
                    }
                    Err(e) => {
                        tracing::debug!(
                            user = %credentials.user_id,
                            error = %e,
                            "cached session rejected, falling back to full login"
                        );
                    }
                }
            }
        }

        let handle = self
            .portal
            .login(credentials)
            .await
            .map_err(|e| match e {
                Error::Authentication(_) => e,
                other => Error::Authentication(other.to_string()),
            })?;

        let (identity, cookies) = handle.export_session()?;
        let session = Session {
            identity,
            cookies,
            password_hash: hash_password(&credentials.password)?,
        };
        self.store.insert(credentials.user_id.clone(), session);

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::types::{Cookie, Lecture};

    /// 记录调用次数的教务系统替身
    struct MockPortal {
        full_logins: AtomicUsize,
        resumes: AtomicUsize,
        reject_login: bool,
        reject_resume: bool,
    }

    impl MockPortal {
        fn new() -> Self {
            Self {
                full_logins: AtomicUsize::new(0),
                resumes: AtomicUsize::new(0),
                reject_login: false,
                reject_resume: false,
            }
        }

        fn rejecting_login() -> Self {
            Self {
                reject_login: true,
                ..Self::new()
            }
        }

        fn rejecting_resume() -> Self {
            Self {
                reject_resume: true,
                ..Self::new()
            }
        }
    }

    #[derive(Clone, Debug)]
    struct MockHandle {
        identity: String,
        cookies: Vec<Cookie>,
    }

    #[async_trait]
    impl PortalHandle for MockHandle {
        async fn lectures(&self) -> Result<Vec<Lecture>> {
            Ok(Vec::new())
        }

        fn export_session(&self) -> Result<(String, Vec<Cookie>)> {
            Ok((self.identity.clone(), self.cookies.clone()))
        }
    }

    #[async_trait]
    impl Portal for MockPortal {
        type Handle = MockHandle;

        async fn login(&self, credentials: &Credentials) -> Result<MockHandle> {
            self.full_logins.fetch_add(1, Ordering::SeqCst);
            if self.reject_login || credentials.password != "p1" {
                return Err(Error::Authentication("用户名或密码错误".to_string()));
            }
            Ok(MockHandle {
                identity: format!("identity-{}", credentials.user_id),
                cookies: vec![Cookie::new("session", "fresh")],
            })
        }

        async fn resume(&self, identity: &str, cookies: &[Cookie]) -> Result<MockHandle> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            if self.reject_resume {
                return Err(Error::Authentication("会话已过期".to_string()));
            }
            Ok(MockHandle {
                identity: identity.to_string(),
                cookies: cookies.to_vec(),
            })
        }
    }

    fn credentials(user_id: &str, password: &str) -> Credentials {
        Credentials {
            user_id: user_id.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_login_populates_cache() {
        let auth = Authenticator::new(MockPortal::new(), Arc::new(SessionStore::new()));

        let handle = auth.login(&credentials("u1", "p1")).await.unwrap();
        assert_eq!(handle.identity, "identity-u1");

        let cached = auth.store().get("u1").expect("登录成功后应当写入缓存");
        assert_eq!(cached.identity, "identity-u1");
        assert!(verify_password("p1", &cached.password_hash));
        assert_ne!(cached.password_hash, "p1");
    }

    #[tokio::test]
    async fn test_cached_session_skips_full_login() {
        let auth = Authenticator::new(MockPortal::new(), Arc::new(SessionStore::new()));

        auth.login(&credentials("u1", "p1")).await.unwrap();
        auth.login(&credentials("u1", "p1")).await.unwrap();

        // 第二次请求只做会话续期
        assert_eq!(auth.portal.full_logins.load(Ordering::SeqCst), 1);
        assert_eq!(auth.portal.resumes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_bypasses_cache() {
        let auth = Authenticator::new(MockPortal::new(), Arc::new(SessionStore::new()));

        auth.login(&credentials("u1", "p1")).await.unwrap();
        let err = auth.login(&credentials("u1", "wrong")).await.unwrap_err();

        // 哈希不匹配不是本地拒绝的理由：不续期，交给教务系统判定
        assert_eq!(auth.portal.resumes.load(Ordering::SeqCst), 0);
        assert_eq!(auth.portal.full_logins.load(Ordering::SeqCst), 2);
        assert!(matches!(err, Error::Authentication(_)));

        // 失败的完整登录不得破坏原有条目
        let cached = auth.store().get("u1").unwrap();
        assert!(verify_password("p1", &cached.password_hash));
    }

    #[tokio::test]
    async fn test_resume_failure_falls_back_to_full_login() {
        let store = Arc::new(SessionStore::new());
        {
            let auth = Authenticator::new(MockPortal::new(), Arc::clone(&store));
            auth.login(&credentials("u1", "p1")).await.unwrap();
        }

        let auth = Authenticator::new(MockPortal::rejecting_resume(), store);
        let handle = auth.login(&credentials("u1", "p1")).await.unwrap();

        assert_eq!(handle.identity, "identity-u1");
        assert_eq!(auth.portal.resumes.load(Ordering::SeqCst), 1);
        assert_eq!(auth.portal.full_logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_rejection_is_authentication_error() {
        let auth = Authenticator::new(MockPortal::rejecting_login(), Arc::new(SessionStore::new()));

        let err = auth.login(&credentials("u1", "p1")).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(auth.store().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_logins_for_distinct_users() {
        let auth = Arc::new(Authenticator::new(
            MockPortal::new(),
            Arc::new(SessionStore::new()),
        ));

        let mut tasks = Vec::new();
        for i in 0..4 {
            let auth = Arc::clone(&auth);
            tasks.push(tokio::spawn(async move {
                auth.login(&credentials(&format!("u{}", i), "p1")).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(auth.store().len(), 4);
        for i in 0..4 {
            let cached = auth.store().get(&format!("u{}", i)).unwrap();
            assert_eq!(cached.identity, format!("identity-u{}", i));
        }
    }
}
