//! 업체 관리자 페이지 접근
//!
//! `PageSource` 는 로그인까지 마친 대시보드 HTML 을 돌려준다.
//! - `HttpPortal`: 로그인 폼을 찾아 아이디/비밀번호를 채워 제출
//! - `SavedPages`: 저장해 둔 `<파일명>.html` 을 읽음 (오프라인 실행, 테스트용)

use crate::config::LoginConfig;
use crate::error::{Result, SalesError};
use crate::roster::RosterEntry;
use reqwest::Url;
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("valid form selector"));
static INPUT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name]").expect("valid input selector"));

#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, entry: &RosterEntry) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

/// 페이지에서 찾은 로그인 폼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub action: Option<String>,
    pub method: FormMethod,
    /// 폼에 원래 들어 있던 값 (hidden 포함)
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    /// 같은 이름의 필드는 바꾸고 없으면 추가
    pub fn set_field(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    /// 제출 주소. action 이 없으면 현재 페이지
    pub fn target(&self, page_url: &Url) -> Result<Url> {
        match self.action.as_deref().map(str::trim) {
            Some(action) if !action.is_empty() => page_url
                .join(action)
                .map_err(|e| SalesError::Login(format!("폼 주소 해석 실패 ({}): {}", action, e))),
            _ => Ok(page_url.clone()),
        }
    }
}

/// `input[name=<user_field>]` 을 포함한 첫 번째 폼
pub fn find_login_form(html: &str, user_field: &str) -> Option<LoginForm> {
    let doc = Html::parse_document(html);

    doc.select(&FORM_SELECTOR).find_map(|form| {
        let inputs: Vec<_> = form.select(&INPUT_SELECTOR).collect();
        let has_user_field = inputs
            .iter()
            .any(|input| input.value().attr("name") == Some(user_field));
        if !has_user_field {
            return None;
        }

        let fields = inputs
            .iter()
            .filter_map(|input| {
                let el = input.value();
                let name = el.attr("name")?;
                let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "image" | "reset" | "file" => None,
                    "checkbox" | "radio" if el.attr("checked").is_none() => None,
                    _ => Some((name.to_string(), el.attr("value").unwrap_or_default().to_string())),
                }
            })
            .collect();

        let method = match form.value().attr("method") {
            Some(m) if m.eq_ignore_ascii_case("get") => FormMethod::Get,
            _ => FormMethod::Post,
        };

        Some(LoginForm {
            action: form.value().attr("action").map(str::to_string),
            method,
            fields,
        })
    })
}

/// HTTP 폼 로그인
#[derive(Debug, Clone)]
pub struct HttpPortal {
    login: LoginConfig,
}

impl HttpPortal {
    pub fn new(login: LoginConfig) -> Self {
        Self { login }
    }

    /// 업체마다 쿠키를 분리하기 위해 매번 새 클라이언트를 만든다
    fn client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(self.login.timeout_seconds))
            .build()?)
    }
}

impl PageSource for HttpPortal {
    async fn fetch(&self, entry: &RosterEntry) -> Result<String> {
        let client = self.client()?;
        let page_url = Url::parse(&entry.url)
            .map_err(|e| SalesError::Login(format!("잘못된 URL ({}): {}", entry.url, e)))?;

        let response = client.get(page_url).send().await?.error_for_status()?;
        let page_url = response.url().clone();
        let html = response.text().await?;

        let mut form = find_login_form(&html, &self.login.user_field).ok_or_else(|| {
            SalesError::Login(format!("로그인 폼을 찾을 수 없습니다: {}", page_url))
        })?;
        form.set_field(&self.login.user_field, &entry.username);
        form.set_field(&self.login.password_field, &entry.password);

        let target = form.target(&page_url)?;
        debug!(company = %entry.stem, url = %target, "로그인 폼 제출");
        let request = match form.method {
            FormMethod::Post => client.post(target).form(&form.fields),
            FormMethod::Get => client.get(target).query(&form.fields),
        };
        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;

        if self.login.settle_seconds > 0 {
            tokio::time::sleep(Duration::from_secs(self.login.settle_seconds)).await;
        }

        if find_login_form(&body, &self.login.user_field).is_some() {
            return Err(SalesError::Login(format!(
                "{}: 로그인 후에도 로그인 폼이 표시됩니다",
                entry.stem
            )));
        }

        info!(company = %entry.stem, bytes = body.len(), "대시보드 수신");
        Ok(body)
    }
}

/// 저장된 HTML 파일
#[derive(Debug, Clone)]
pub struct SavedPages {
    dir: PathBuf,
}

impl SavedPages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn page_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.html", stem))
    }
}

impl PageSource for SavedPages {
    async fn fetch(&self, entry: &RosterEntry) -> Result<String> {
        let path = self.page_path(&entry.stem);
        if !path.exists() {
            return Err(SalesError::FileNotFound(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}
