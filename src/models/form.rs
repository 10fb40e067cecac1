use chrono::{NaiveDate, NaiveDateTime};

use super::record::{EvaluationRecord, BIRTH_DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::error::FormError;

/// 缺勤学生的评语正文，替换表单中填写的内容
pub const NOT_ATTENDING_TEXT: &str = "Durante o período letivo, o(a) aluno(a) não frequentou a escola, não apresentando os critérios mínimos para avaliação.";

/// 表单输入
///
/// 由界面层收集，提交前调用 [`ParecerForm::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParecerForm {
    pub student_name: String,
    pub mother_name: String,
    pub father_name: String,
    pub address: String,
    pub birthplace: String,
    pub birth_date: NaiveDate,
    pub period: String,
    pub shift: String,
    pub evaluation_text: String,
    pub observation: String,
    pub did_not_attend: bool,
}

impl ParecerForm {
    /// 校验表单
    ///
    /// 必须选择学生；未标记缺勤时必须填写评语。
    /// `roster` 非空时学生必须在名册中。
    pub fn validate(&self, roster: &[String]) -> Result<(), FormError> {
        if self.student_name.is_empty() {
            return Err(FormError::MissingStudent);
        }
        if self.evaluation_text.is_empty() && !self.did_not_attend {
            return Err(FormError::MissingEvaluation {
                student: self.student_name.clone(),
            });
        }
        if !roster.is_empty() && !roster.iter().any(|name| *name == self.student_name) {
            return Err(FormError::UnknownStudent {
                student: self.student_name.clone(),
            });
        }
        Ok(())
    }

    /// 生成评语（尚未附带文档）
    ///
    /// 缺勤学生的评语正文固定为 [`NOT_ATTENDING_TEXT`]
    pub fn to_record(&self, id: u32, created_at: NaiveDateTime) -> EvaluationRecord {
        let evaluation_text = if self.did_not_attend {
            NOT_ATTENDING_TEXT.to_string()
        } else {
            self.evaluation_text.clone()
        };

        EvaluationRecord {
            id,
            student_name: self.student_name.clone(),
            mother_name: self.mother_name.clone(),
            father_name: self.father_name.clone(),
            address: self.address.clone(),
            birthplace: self.birthplace.clone(),
            birth_date: self.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            period: self.period.clone(),
            shift: self.shift.clone(),
            evaluation_text,
            observation: self.observation.clone(),
            created_at: created_at.format(TIMESTAMP_FORMAT).to_string(),
            did_not_attend: self.did_not_attend,
            document_hex: None,
        }
    }
}

/// 解析出生日期，接受 `DD/MM/YYYY` 或 `YYYY-MM-DD`
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, FormError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, BIRTH_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|_| FormError::InvalidBirthDate {
            value: value.to_string(),
        })
}
