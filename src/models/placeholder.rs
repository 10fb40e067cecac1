use std::collections::BTreeMap;

use super::record::EvaluationRecord;

/// 模板中可识别的占位符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    /// 学校名称
    SchoolName,
    /// 学生姓名
    StudentName,
    /// 母亲姓名
    MotherName,
    /// 父亲姓名
    FatherName,
    /// 地址
    Address,
    /// 籍贯
    Birthplace,
    /// 出生日期
    BirthDate,
    /// 学期
    Period,
    /// 班次
    Shift,
    /// 评语正文
    EvaluationText,
    /// 评语日期
    EvaluationDate,
    /// 备注
    Observation,
}

impl Placeholder {
    pub const ALL: [Placeholder; 12] = [
        Placeholder::SchoolName,
        Placeholder::StudentName,
        Placeholder::MotherName,
        Placeholder::FatherName,
        Placeholder::Address,
        Placeholder::Birthplace,
        Placeholder::BirthDate,
        Placeholder::Period,
        Placeholder::Shift,
        Placeholder::EvaluationText,
        Placeholder::EvaluationDate,
        Placeholder::Observation,
    ];

    /// 模板中的字面标记（区分大小写）
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::SchoolName => "NOME_ESCOLA",
            Placeholder::StudentName => "NOME_ALUNO",
            Placeholder::MotherName => "NOME_MAE",
            Placeholder::FatherName => "NOME_PAI",
            Placeholder::Address => "ENDERECO",
            Placeholder::Birthplace => "NATURALIDADE",
            Placeholder::BirthDate => "NASCIMENTO",
            Placeholder::Period => "PERIODO",
            Placeholder::Shift => "TURNO",
            Placeholder::EvaluationText => "PARECER_TEXTO",
            Placeholder::EvaluationDate => "DATA_PARECER",
            Placeholder::Observation => "OBSERVACAO",
        }
    }

    /// 从字面标记解析
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// 占位符 → 替换文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    values: BTreeMap<Placeholder, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由评语生成替换表
    ///
    /// # 参数
    /// - `record`: 评语
    /// - `school_name`: 学校名称，`None` 时不替换 `NOME_ESCOLA`
    pub fn from_record(record: &EvaluationRecord, school_name: Option<&str>) -> Self {
        let mut subs = Self::new()
            .with(Placeholder::StudentName, &record.student_name)
            .with(Placeholder::MotherName, &record.mother_name)
            .with(Placeholder::FatherName, &record.father_name)
            .with(Placeholder::Address, &record.address)
            .with(Placeholder::Birthplace, &record.birthplace)
            .with(Placeholder::BirthDate, &record.birth_date)
            .with(Placeholder::Period, &record.period)
            .with(Placeholder::Shift, &record.shift)
            .with(Placeholder::EvaluationText, &record.evaluation_text)
            .with(Placeholder::EvaluationDate, &record.created_at)
            .with(Placeholder::Observation, &record.observation);
        if let Some(name) = school_name {
            subs.insert(Placeholder::SchoolName, name);
        }
        subs
    }

    pub fn with(mut self, placeholder: Placeholder, value: impl ToString) -> Self {
        self.insert(placeholder, value);
        self
    }

    pub fn insert(&mut self, placeholder: Placeholder, value: impl ToString) {
        self.values.insert(placeholder, value.to_string());
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }

    /// 按字面标记查找替换文本
    pub fn value_for_token(&self, token: &str) -> Option<&str> {
        Placeholder::from_token(token).and_then(|p| self.get(p))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.values.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
