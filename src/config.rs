use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 模板选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    /// 固定使用同一个模板，并替换 `NOME_ESCOLA`
    Fixed,
    /// 按约定选择：缺勤模板 → 学生专属模板 → 通用模板
    Convention,
}

impl TemplateMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(TemplateMode::Fixed),
            "convention" => Some(TemplateMode::Convention),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateMode::Fixed => write!(f, "fixed"),
            TemplateMode::Convention => write!(f, "convention"),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 评语数据文件
    pub data_file: PathBuf,
    /// 模板目录（约定模式）
    pub templates_dir: PathBuf,
    /// 模板选择方式
    pub template_mode: TemplateMode,
    /// 固定模板路径（固定模式）
    pub fixed_template: PathBuf,
    /// 学校名称，仅固定模式下替换
    pub school_name: String,
    /// 替换后是否将非空段落设为两端对齐
    pub justify_paragraphs: bool,
    /// 学生名册，为空时不限制
    pub students: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/pareceres.json"),
            templates_dir: PathBuf::from("templates"),
            template_mode: TemplateMode::Convention,
            fixed_template: PathBuf::from("parecer_template.docx"),
            school_name:
                "ESCOLA MUNICIPAL DE EDUCAÇÃO FUNDAMENTAL ELESBÃO BARBOSA DE CARVALHO".to_string(),
            justify_paragraphs: true,
            students: Vec::new(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：可选的 TOML 文件，再叠加环境变量
    ///
    /// # 参数
    /// - `path`: 配置文件路径，`None` 时使用默认值
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides(|name| std::env::var(name).ok())?)
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content, path)?)
    }

    fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 按变量名返回取值，测试时可传入固定映射
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PARECER_DATA_FILE") {
            self.data_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("PARECER_TEMPLATES_DIR") {
            self.templates_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PARECER_TEMPLATE_MODE") {
            self.template_mode =
                TemplateMode::parse(&v).ok_or_else(|| parse_failed("PARECER_TEMPLATE_MODE", &v, "TemplateMode"))?;
        }
        if let Some(v) = lookup("PARECER_FIXED_TEMPLATE") {
            self.fixed_template = PathBuf::from(v);
        }
        if let Some(v) = lookup("PARECER_SCHOOL_NAME") {
            self.school_name = v;
        }
        if let Some(v) = lookup("PARECER_JUSTIFY") {
            self.justify_paragraphs = v.parse().map_err(|_| parse_failed("PARECER_JUSTIFY", &v, "bool"))?;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = v.parse().map_err(|_| parse_failed("VERBOSE_LOGGING", &v, "bool"))?;
        }
        Ok(self)
    }

    /// 按字母顺序返回名册
    pub fn sorted_roster(&self) -> Vec<String> {
        let mut names = self.students.clone();
        names.sort();
        names
    }
}

fn parse_failed(var_name: &str, value: &str, expected_type: &str) -> ConfigError {
    ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let content = r#"
            data_file = "/srv/escola/pareceres.json"
            template_mode = "fixed"
            students = ["Thayse Ferreira dos Santos", "Adalva Gomes dos Santos"]
        "#;
        let config = Config::from_toml_str(content, Path::new("parecer.toml")).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/srv/escola/pareceres.json"));
        assert_eq!(config.template_mode, TemplateMode::Fixed);
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert!(config.justify_paragraphs);
        assert_eq!(
            config.sorted_roster(),
            vec!["Adalva Gomes dos Santos", "Thayse Ferreira dos Santos"]
        );
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let err = Config::from_toml_str("template_mode = 3", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn env_overrides_apply() {
        let config = Config::default()
            .with_env_overrides(lookup_from(&[
                ("PARECER_TEMPLATE_MODE", "Fixed"),
                ("PARECER_JUSTIFY", "false"),
                ("PARECER_SCHOOL_NAME", "Escola Teste"),
            ]))
            .unwrap();
        assert_eq!(config.template_mode, TemplateMode::Fixed);
        assert!(!config.justify_paragraphs);
        assert_eq!(config.school_name, "Escola Teste");
    }

    #[test]
    fn unparseable_env_value_is_an_error() {
        let err = Config::default()
            .with_env_overrides(lookup_from(&[("PARECER_JUSTIFY", "talvez")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "PARECER_JUSTIFY"
        ));
    }
}
