//! 설정 파일 관리.
//!
//! JSON 설정 파일 하나를 읽어 메모리에 두고, 변경은 파일에 먼저 쓴 뒤 반영한다.
//! 파일이 없으면 기본 설정으로 만든다.

use crate::config::AppConfig;
use crate::error::CoreError;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 설정 관리자
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    current: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    /// 지정된 경로로 생성. 상위 디렉토리와 기본 설정 파일을 필요하면 만든다.
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        let config = load_or_init(&path)?;
        Ok(Self {
            path,
            current: Arc::new(RwLock::new(config)),
        })
    }

    /// 현재 설정 복제본
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// 설정 일부 변경 후 저장. 저장에 실패하면 메모리 설정은 그대로다.
    pub fn update_with<F>(&self, updater: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut current = self.current.write();
        let mut next = current.clone();
        updater(&mut next);
        write_config(&self.path, &next)?;
        *current = next.clone();
        debug!("설정 저장: {}", self.path.display());
        Ok(next)
    }

    /// 파일에서 다시 읽기
    pub fn reload(&self) -> Result<AppConfig, CoreError> {
        let config = read_config(&self.path)?;
        *self.current.write() = config.clone();
        info!("설정 다시 로드: {}", self.path.display());
        Ok(config)
    }
}

fn load_or_init(path: &Path) -> Result<AppConfig, CoreError> {
    if path.exists() {
        return read_config(path);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CoreError::Config(format!("설정 디렉토리 생성 실패: {}: {e}", parent.display()))
        })?;
    }
    let config = AppConfig::default_config();
    write_config(path, &config)?;
    info!("기본 설정 파일 생성: {}", path.display());
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let content = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("설정 파일 읽기 실패: {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| CoreError::Config(format!("설정 파일 파싱 실패: {}: {e}", path.display())))
}

/// 임시 파일에 쓴 뒤 rename
fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| CoreError::Config(format!("설정 직렬화 실패: {e}")))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| CoreError::Config(format!("설정 파일 저장 실패: {}: {e}", path.display())))
}
