//! # Parecer Gen
//!
//! 学生评语（parecer）的录入、存档与 docx 生成
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 docx 文件包，只暴露"读/换/写部件"的能力
//! - `DocxPackage` - docx 压缩包
//! - `WordXml` - 段落文本读取、改写与对齐
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `RecordStore` - 整体读写评语数据文件
//! - `TemplateResolver` - 选择模板文件
//! - `DocumentRenderer` - 替换占位符并对齐段落
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次提交、一次查阅的完整流程
//! - `ParecerFlow` - 校验 → 读取 → 选模板 → 渲染 → 追加 → 写回
//!
//! ### ④ 界面层
//! - `src/main.rs` - 命令行，调用流程层
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, TemplateMode};
pub use error::{AppError, AppResult};
pub use infrastructure::DocxPackage;
pub use models::{EvaluationRecord, ParecerArchive, ParecerForm, Placeholder, Substitutions};
pub use services::{DocumentRenderer, RecordStore, TemplateResolver};
pub use workflow::{ParecerFlow, PayloadStatus, SavedReport, SubmitOutcome};
