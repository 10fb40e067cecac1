//! 模板选择服务 - 业务能力层

use std::path::PathBuf;

use tracing::debug;

use crate::config::{Config, TemplateMode};
use crate::error::{AppError, AppResult};
use crate::models::EvaluationRecord;
use crate::utils::sanitize;

/// 缺勤学生使用的模板
pub const NOT_ATTENDING_TEMPLATE: &str = "template_nao_frequentou.docx";
/// 通用模板
pub const GENERIC_TEMPLATE: &str = "parecer_template.docx";

/// 按配置为评语选择模板文件
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    mode: TemplateMode,
    templates_dir: PathBuf,
    fixed_template: PathBuf,
}

impl TemplateResolver {
    pub fn new(mode: TemplateMode, templates_dir: impl Into<PathBuf>, fixed_template: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            templates_dir: templates_dir.into(),
            fixed_template: fixed_template.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.template_mode,
            config.templates_dir.clone(),
            config.fixed_template.clone(),
        )
    }

    /// 只有固定模板模式替换 `NOME_ESCOLA`
    pub fn substitutes_school_name(&self) -> bool {
        self.mode == TemplateMode::Fixed
    }

    /// 按优先顺序列出候选模板
    ///
    /// 固定模式只有一个候选；约定模式下缺勤学生只用缺勤模板，
    /// 其他学生依次尝试 `template_{姓名}.docx` 和通用模板
    pub fn candidates(&self, record: &EvaluationRecord) -> Vec<PathBuf> {
        match self.mode {
            TemplateMode::Fixed => vec![self.fixed_template.clone()],
            TemplateMode::Convention if record.did_not_attend => {
                vec![self.templates_dir.join(NOT_ATTENDING_TEMPLATE)]
            }
            TemplateMode::Convention => {
                let mut paths = Vec::with_capacity(2);
                let token = sanitize(&record.student_name);
                if !token.is_empty() {
                    paths.push(self.templates_dir.join(format!("template_{token}.docx")));
                }
                paths.push(self.templates_dir.join(GENERIC_TEMPLATE));
                paths
            }
        }
    }

    /// 返回第一个存在的候选模板
    pub fn resolve(&self, record: &EvaluationRecord) -> AppResult<PathBuf> {
        let searched = self.candidates(record);
        for path in &searched {
            if path.is_file() {
                debug!("使用模板: {}", path.display());
                return Ok(path.clone());
            }
            debug!("模板不存在: {}", path.display());
        }
        Err(AppError::TemplateNotFound { searched })
    }
}
