use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{
    Client, StatusCode,
    header::{COOKIE, SET_COOKIE},
    redirect,
};
use serde::Deserialize;

use super::{Portal, PortalHandle};
use crate::{
    Error, Result,
    types::{Cookie, Credentials, Lecture},
};

const LOGIN_URL: &str = "https://jwcjwxt1.fzu.edu.cn/logincheck.asp";
const API_ROOT: &str = "https://jwcjwxt2.fzu.edu.cn:81";
const USER_AGENT: &str = "FZU-ICS-Rust/0.1.0";

/// 讲座列表响应
#[derive(Debug, Deserialize)]
struct LectureResponse {
    code: i32,
    info: String,
    data: Vec<LectureRow>,
}

/// 单条讲座记录
#[derive(Debug, Deserialize)]
struct LectureRow {
    #[serde(rename = "type")]
    category: String,
    #[serde(rename = "issueNumber")]
    issue_number: i64,
    title: String,
    speaker: String,
    #[serde(rename = "attendanceStatus")]
    attendance_status: String,
    location: String,
    #[serde(rename = "timestamp")]
    timestamp_millis: i64,
}

impl From<LectureRow> for Lecture {
    fn from(row: LectureRow) -> Self {
        Self {
            category: row.category,
            issue_number: row.issue_number,
            title: row.title,
            speaker: row.speaker,
            attendance_status: row.attendance_status,
            location: row.location,
            timestamp_millis: row.timestamp_millis,
        }
    }
}

/// 福州大学教务处客户端
///
/// 登录接口通过脚本跳转携带身份标识，必须禁用自动重定向并手动
/// 收集 Set-Cookie。
pub struct JwchPortal {
    client: Client,
}

impl JwchPortal {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// 通用的请求错误处理
    fn handle_error_req(error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(error)
        }
    }

    fn cookie_header(cookies: &[Cookie]) -> String {
        cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn collect_cookies(response: &reqwest::Response) -> Vec<Cookie> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| {
                let pair = value.split(';').next()?;
                let (name, value) = pair.split_once('=')?;
                Some(Cookie::new(name.trim(), value.trim()))
            })
            .collect()
    }

    /// 从登录响应中提取身份标识，失败时带回页面给出的拒绝原因
    fn extract_identity(body: &str) -> Result<String> {
        let id_re = Regex::new(r"id=(\d{10,})").unwrap();
        if let Some(captures) = id_re.captures(body) {
            return Ok(captures[1].to_string());
        }

        let msg_re = Regex::new(r"alert\('([^']+)'\)").unwrap();
        let message = msg_re
            .captures(body)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "用户名或密码错误".to_string());
        Err(Error::Authentication(message))
    }
}

impl Default for JwchPortal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Portal for JwchPortal {
    type Handle = JwchHandle;

    async fn login(&self, credentials: &Credentials) -> Result<JwchHandle> {
        tracing::info!(user = %credentials.user_id, "logging in to jwch");

        let params = [
            ("muser", credentials.user_id.as_str()),
            ("passwd", credentials.password.as_str()),
        ];
        let response = self
            .client
            .post(LOGIN_URL)
            .form(&params)
            .send()
            .await
            .map_err(Self::handle_error_req)?;

        let cookies = Self::collect_cookies(&response);
        let body = response.text().await.map_err(Self::handle_error_req)?;
        let identity = Self::extract_identity(&body)?;

        Ok(JwchHandle {
            client: self.client.clone(),
            identity,
            cookies,
        })
    }

    async fn resume(&self, identity: &str, cookies: &[Cookie]) -> Result<JwchHandle> {
        tracing::debug!("revalidating cached jwch session");

        let url = format!("{}/ssoLogin/check", API_ROOT);
        let response = self
            .client
            .get(&url)
            .query(&[("id", identity)])
            .header(COOKIE, Self::cookie_header(cookies))
            .send()
            .await
            .map_err(Self::handle_error_req)?;

        if response.status() != StatusCode::OK {
            return Err(Error::Authentication(format!(
                "会话校验失败: HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(Self::handle_error_req)?;
        if body.contains("处理失败") || body.contains("重新登录") {
            return Err(Error::Authentication("会话已过期".to_string()));
        }

        Ok(JwchHandle {
            client: self.client.clone(),
            identity: identity.to_string(),
            cookies: cookies.to_vec(),
        })
    }
}

/// jwch 活动会话
#[derive(Debug, Clone)]
pub struct JwchHandle {
    client: Client,
    identity: String,
    cookies: Vec<Cookie>,
}

#[async_trait]
impl PortalHandle for JwchHandle {
    async fn lectures(&self) -> Result<Vec<Lecture>> {
        let url = format!("{}/student/lecture/list", API_ROOT);
        let response = self
            .client
            .get(&url)
            .query(&[("id", self.identity.as_str())])
            .header(COOKIE, JwchPortal::cookie_header(&self.cookies))
            .send()
            .await
            .map_err(JwchPortal::handle_error_req)?;

        if response.status() != StatusCode::OK {
            return Err(Error::Fetch(format!(
                "讲座列表请求失败: HTTP {}",
                response.status()
            )));
        }

        let decoded: LectureResponse = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("讲座列表解析失败: {}", e)))?;

        if decoded.code != 200 {
            return Err(Error::Fetch(decoded.info));
        }

        Ok(decoded.data.into_iter().map(Into::into).collect())
    }

    fn export_session(&self) -> Result<(String, Vec<Cookie>)> {
        Ok((self.identity.clone(), self.cookies.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_identity_from_redirect() {
        let body = r#"<script>window.location.href='https://jwcjwxt2.fzu.edu.cn:81/loginchk_xs.aspx?id=20240101123456&num=308';</script>"#;
        let identity = JwchPortal::extract_identity(body).unwrap();
        assert_eq!(identity, "20240101123456");
    }

    #[test]
    fn test_extract_identity_carries_portal_message() {
        let body = r#"<script>alert('用户名或密码错误！');window.history.back();</script>"#;
        let err = JwchPortal::extract_identity(body).unwrap_err();
        match err {
            Error::Authentication(message) => assert!(message.contains("用户名或密码错误")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cookie_header_keeps_order() {
        let cookies = vec![
            Cookie::new("ASP.NET_SessionId", "abc"),
            Cookie::new("route", "node-2"),
        ];
        assert_eq!(
            JwchPortal::cookie_header(&cookies),
            "ASP.NET_SessionId=abc; route=node-2"
        );
    }

    #[test]
    fn test_lecture_row_decoding() {
        let raw = r#"{
            "code": 200,
            "info": "ok",
            "data": [{
                "type": "学术",
                "issueNumber": 7,
                "title": "AI讲座",
                "speaker": "张三",
                "attendanceStatus": "已听取",
                "location": "嘉锡楼",
                "timestamp": 1742540400000
            }]
        }"#;
        let decoded: LectureResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.code, 200);
        let lecture: Lecture = decoded.data.into_iter().next().unwrap().into();
        assert_eq!(lecture.issue_number, 7);
        assert_eq!(lecture.timestamp_millis, 1742540400000);
    }
}
