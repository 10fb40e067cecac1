//! 评语处理流程 - 流程层
//!
//! 核心职责：定义"一次提交"和"一次查阅"的完整流程
//!
//! 提交顺序：
//! 1. 校验表单 → 读取数据文件 → 生成评语
//! 2. 选择模板 → 渲染文档
//! 3. 评语与文档一起追加 → 整体写回
//!
//! 第 2 步失败时不会写入任何数据

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::infrastructure::DocxPackage;
use crate::models::{EvaluationRecord, ParecerForm, Substitutions};
use crate::services::{DocumentRenderer, RecordStore, TemplateResolver};
use crate::utils::{archived_download_name, fresh_download_name, logging};

/// 提交结果
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// 已保存的评语（含文档数据）
    pub record: EvaluationRecord,
    /// 渲染好的 docx
    pub document: Vec<u8>,
    /// 建议的下载文件名
    pub download_name: String,
    /// 实际使用的模板
    pub template: PathBuf,
}

/// 历史评语的文档状态
#[derive(Debug)]
pub enum PayloadStatus {
    /// 可以下载
    Available { bytes: Vec<u8>, download_name: String },
    /// 没有保存文档
    Missing,
    /// 文档数据损坏，只影响这一条评语
    Corrupted(AppError),
}

/// 一条历史评语
#[derive(Debug)]
pub struct SavedReport {
    /// 在学生列表中的位置（从 0 开始）
    pub index: usize,
    pub record: EvaluationRecord,
    pub payload: PayloadStatus,
}

/// 评语处理流程
///
/// - 编排 存储 → 模板 → 渲染 → 存储 的顺序
/// - 配置在构造时传入，不依赖全局状态
pub struct ParecerFlow {
    store: RecordStore,
    resolver: TemplateResolver,
    renderer: DocumentRenderer,
    school_name: String,
    roster: Vec<String>,
}

impl ParecerFlow {
    /// 创建新的评语处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            store: RecordStore::new(config.data_file.clone()),
            resolver: TemplateResolver::from_config(config),
            renderer: DocumentRenderer::new(config.justify_paragraphs),
            school_name: config.school_name.clone(),
            roster: config.students.clone(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// 提交表单，使用当前时间
    pub fn submit(&self, form: &ParecerForm) -> AppResult<SubmitOutcome> {
        self.submit_at(form, Local::now().naive_local())
    }

    /// 提交表单
    ///
    /// # 参数
    /// - `form`: 表单输入
    /// - `now`: 评语生成时间
    ///
    /// # 返回
    /// 成功时评语已写入数据文件
    pub fn submit_at(&self, form: &ParecerForm, now: NaiveDateTime) -> AppResult<SubmitOutcome> {
        form.validate(&self.roster)?;

        let mut archive = self.store.load()?;
        let id = archive.next_id(&form.student_name);
        let record = form.to_record(id, now);
        info!(
            "📝 生成评语: {} #{} ({})",
            record.student_name,
            id,
            logging::text_preview(&record.evaluation_text, 40)
        );

        let template = self.resolver.resolve(&record).inspect_err(|e| {
            error!("❌ {}", e);
        })?;
        let document = self.render(&template, &record).inspect_err(|e| {
            error!("❌ 模板 {} 渲染失败: {}", template.display(), e);
        })?;

        let record = record.with_document(&document);
        archive.append(record.clone());
        self.store.save(&archive)?;
        logging::log_submit_complete(&record.student_name, record.id, document.len());

        Ok(SubmitOutcome {
            download_name: fresh_download_name(&record.student_name, now),
            record,
            document,
            template,
        })
    }

    fn render(&self, template: &Path, record: &EvaluationRecord) -> AppResult<Vec<u8>> {
        let package = DocxPackage::open(template)?;
        let school_name = self
            .resolver
            .substitutes_school_name()
            .then_some(self.school_name.as_str());
        let subs = Substitutions::from_record(record, school_name);
        Ok(self.renderer.render(&package, &subs)?.into_inner())
    }

    /// 已有评语的学生（按字母顺序）
    pub fn students_with_reports(&self) -> AppResult<Vec<String>> {
        let archive = self.store.load()?;
        Ok(archive.students().map(str::to_string).collect())
    }

    /// 某个学生的全部历史评语
    ///
    /// 单条评语的文档损坏不会影响其他评语的列出
    pub fn saved_reports(&self, student: &str) -> AppResult<Vec<SavedReport>> {
        let archive = self.store.load()?;
        let reports = archive
            .records_for(student)
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let payload = match record.document_bytes(index) {
                    Ok(Some(bytes)) => PayloadStatus::Available {
                        bytes,
                        download_name: archived_download_name(student, &record.created_at, index),
                    },
                    Ok(None) => PayloadStatus::Missing,
                    Err(e) => {
                        warn!("⚠️ {}", e);
                        PayloadStatus::Corrupted(e)
                    }
                };
                SavedReport {
                    index,
                    record: record.clone(),
                    payload,
                }
            })
            .collect();
        Ok(reports)
    }

    /// 取出一条历史评语的文档
    ///
    /// # 返回
    /// (下载文件名, 文档字节)
    pub fn archived_document(&self, student: &str, index: usize) -> AppResult<(String, Vec<u8>)> {
        let archive = self.store.load()?;
        let record = archive
            .records_for(student)
            .get(index)
            .ok_or_else(|| FileError::RecordNotFound {
                student: student.to_string(),
                index,
            })?;

        match record.document_bytes(index)? {
            Some(bytes) => Ok((
                archived_download_name(student, &record.created_at, index),
                bytes,
            )),
            None => Err(FileError::DocumentMissing {
                student: student.to_string(),
                index,
            }
            .into()),
        }
    }
}
