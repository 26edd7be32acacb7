use crate::error::{Result, SalesError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 병합 시점
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeSchedule {
    /// 업체 하나를 처리할 때마다 전체 폴더를 다시 병합 (실행 중에도 마스터 확인 가능)
    #[default]
    EachCompany,
    /// 모든 업체 처리 후 한 번만 병합
    Once,
}

impl std::str::FromStr for MergeSchedule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "each_company" | "each" => Ok(MergeSchedule::EachCompany),
            "once" => Ok(MergeSchedule::Once),
            _ => Err(format!("Unknown merge schedule: {}. Use each_company or once", s)),
        }
    }
}

impl std::fmt::Display for MergeSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeSchedule::EachCompany => write!(f, "each_company"),
            MergeSchedule::Once => write!(f, "once"),
        }
    }
}

/// 로그인 폼 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub user_field: String,
    pub password_field: String,
    pub timeout_seconds: u64,
    /// 로그인 후 페이지 로딩 대기
    pub settle_seconds: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            user_field: "master_id".into(),
            password_field: "master_pw".into(),
            timeout_seconds: 10,
            settle_seconds: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roster_path: PathBuf,
    pub roster_sheet: String,
    pub template_path: PathBuf,
    pub master_sheet: String,
    pub output_dir: PathBuf,
    pub login: LoginConfig,
    pub merge_schedule: MergeSchedule,
    /// 메모를 기록할 열 (51 = AY)
    pub note_column: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster_path: "data.xlsx".into(),
            roster_sheet: "계정정보".into(),
            template_path: "가구사_일일매출_템플릿.xlsx".into(),
            master_sheet: "평일".into(),
            output_dir: "result".into(),
            login: LoginConfig::default(),
            merge_schedule: MergeSchedule::default(),
            note_column: 51,
        }
    }
}

/// 기준 폴더로 풀어낸 실제 경로
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub roster: PathBuf,
    pub template: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SalesError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("daily-sales").join("config.json"))
    }

    /// 상대 경로를 base_dir 기준으로 해석
    pub fn resolve(&self, base_dir: &Path) -> RunPaths {
        let join = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };
        RunPaths {
            roster: join(&self.roster_path),
            template: join(&self.template_path),
            output_dir: join(&self.output_dir),
        }
    }
}

impl RunPaths {
    /// 결과 폴더가 없으면 만든다
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}
