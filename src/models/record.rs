use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 评语生成时间的存储格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 出生日期的显示格式
pub const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

/// 一份已生成的评语
///
/// 字段名沿用数据文件中已有的键，生成后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// 学生内的序号，从 1 开始
    pub id: u32,
    #[serde(rename = "nome")]
    pub student_name: String,
    #[serde(rename = "filiacao_mae", default)]
    pub mother_name: String,
    #[serde(rename = "filiacao_pai", default)]
    pub father_name: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "naturalidade", default)]
    pub birthplace: String,
    /// `DD/MM/YYYY`
    #[serde(rename = "data_nascimento", default)]
    pub birth_date: String,
    #[serde(rename = "periodo", default)]
    pub period: String,
    #[serde(rename = "turno", default)]
    pub shift: String,
    #[serde(rename = "parecer_texto", default)]
    pub evaluation_text: String,
    #[serde(rename = "observacao", default)]
    pub observation: String,
    /// `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "data")]
    pub created_at: String,
    #[serde(rename = "nao_frequentou", default)]
    pub did_not_attend: bool,
    /// 十六进制编码的 docx 文档
    #[serde(rename = "docx_data", default, skip_serializing_if = "Option::is_none")]
    pub document_hex: Option<String>,
}

impl EvaluationRecord {
    /// 附加渲染好的文档
    pub fn with_document(mut self, bytes: &[u8]) -> Self {
        self.document_hex = Some(hex::encode(bytes));
        self
    }

    /// 是否存有文档数据
    pub fn has_document(&self) -> bool {
        self.document_hex.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// 解码存储的文档
    ///
    /// # 参数
    /// - `index`: 记录在学生列表中的位置（仅用于错误信息）
    ///
    /// # 返回
    /// 没有文档时返回 `None`，数据损坏时返回 `CorruptedPayload`
    pub fn document_bytes(&self, index: usize) -> AppResult<Option<Vec<u8>>> {
        match self.document_hex.as_deref() {
            None | Some("") => Ok(None),
            Some(encoded) => hex::decode(encoded)
                .map(Some)
                .map_err(|source| AppError::CorruptedPayload {
                    student: self.student_name.clone(),
                    index,
                    source,
                }),
        }
    }
}
