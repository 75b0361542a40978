//! Runtime configuration with sensible deployed defaults; an optional
//! `config.yml` next to the binary overrides them.

use serde::Deserialize;
use std::path::Path;

const CONFIG_PATH: &str = "./config.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the chatbot backend; the gateway appends `/chat`.
    pub backend_base_url: String,
    /// Links starting with this origin go through the redirect guard.
    pub portal_origin: String,
    /// Host serving `redirect.html`, the verification indirection page.
    pub verifier_base_url: String,
    /// Canned questions offered in the sidebar.
    pub quick_actions: Vec<QuickAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickAction {
    pub label: String,
    pub question: String,
}

impl QuickAction {
    fn new(label: &str, question: &str) -> Self {
        Self {
            label: label.to_string(),
            question: question.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "https://youth-chatbot-backend.onrender.com".to_string(),
            portal_origin: "https://youth.seoul.go.kr/".to_string(),
            verifier_base_url: "https://youth-chatbot-frontend.onrender.com".to_string(),
            quick_actions: vec![
                QuickAction::new("💼 일자리 정보", "청년 일자리 지원 사업에 대해 알려주세요"),
                QuickAction::new("🎓 교육 프로그램", "청년 대상 교육 프로그램이 있나요?"),
                QuickAction::new("❤️ 복지 혜택", "청년이 받을 수 있는 복지 혜택을 알려주세요"),
                QuickAction::new("🏠 주거 지원", "청년 주거 지원 정책에 대해 설명해주세요"),
                QuickAction::new("📅 행사 일정", "이번 달 청년 대상 행사가 있나요?"),
                QuickAction::new("📍 시설 안내", "청년 이용 가능한 시설을 안내해주세요"),
            ],
        }
    }
}

impl Config {
    /// Load `./config.yml` if present; otherwise use the defaults.
    /// A malformed file is logged and ignored rather than fatal.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_six_quick_actions() {
        let config = Config::default();
        assert_eq!(config.quick_actions.len(), 6);
        assert!(config.backend_base_url.starts_with("https://"));
    }

    #[test]
    fn partial_yaml_overrides_keep_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "backend_base_url: \"http://localhost:8000\"").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.backend_base_url, "http://localhost:8000");
        assert_eq!(config.portal_origin, "https://youth.seoul.go.kr/");
        assert_eq!(config.quick_actions.len(), 6);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_from(Path::new("./does-not-exist.yml"));
        assert_eq!(config.portal_origin, "https://youth.seoul.go.kr/");
    }
}
