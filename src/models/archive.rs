use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::EvaluationRecord;

/// 全部评语：学生姓名 → 按生成顺序排列的评语列表
///
/// 姓名按原样作为键，区分大小写，不做 trim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParecerArchive {
    students: BTreeMap<String, Vec<EvaluationRecord>>,
}

impl ParecerArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一条评语的序号：已有数量 + 1
    pub fn next_id(&self, student: &str) -> u32 {
        self.records_for(student).len() as u32 + 1
    }

    /// 追加评语，首条评语时创建该学生的键
    pub fn append(&mut self, record: EvaluationRecord) -> &EvaluationRecord {
        let list = self
            .students
            .entry(record.student_name.clone())
            .or_default();
        list.push(record);
        &list[list.len() - 1]
    }

    /// 某个学生的全部评语
    pub fn records_for(&self, student: &str) -> &[EvaluationRecord] {
        self.students.get(student).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 已有评语的学生姓名（按字母顺序）
    pub fn students(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// 学生数量
    pub fn len(&self) -> usize {
        self.students.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(student: &str, id: u32, text: &str) -> EvaluationRecord {
        EvaluationRecord {
            id,
            student_name: student.to_string(),
            mother_name: String::new(),
            father_name: String::new(),
            address: String::new(),
            birthplace: String::new(),
            birth_date: "01/02/2016".to_string(),
            period: String::new(),
            shift: String::new(),
            evaluation_text: text.to_string(),
            observation: String::new(),
            created_at: "2024-05-01 10:00:00".to_string(),
            did_not_attend: false,
            document_hex: Some("504b".to_string()),
        }
    }

    #[test]
    fn ids_grow_per_student() {
        let mut archive = ParecerArchive::new();
        assert_eq!(archive.next_id("Ana"), 1);

        let id = archive.next_id("Ana");
        archive.append(record("Ana", id, "primeiro"));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.records_for("Ana").len(), 1);
        assert_eq!(archive.records_for("Ana")[0].id, 1);

        let id = archive.next_id("Ana");
        archive.append(record("Ana", id, "segundo"));
        let list = archive.records_for("Ana");
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, 2);
        assert_eq!(list[0], record("Ana", 1, "primeiro"));

        assert_eq!(archive.next_id("Bruno"), 1);
    }

    #[test]
    fn names_are_exact_keys() {
        let mut archive = ParecerArchive::new();
        archive.append(record("Ana", 1, "x"));
        assert!(archive.records_for("ana").is_empty());
        assert!(archive.records_for("Ana ").is_empty());
        assert_eq!(archive.next_id("ANA"), 1);
    }

    #[test]
    fn students_are_sorted() {
        let mut archive = ParecerArchive::new();
        archive.append(record("Thayse", 1, "x"));
        archive.append(record("Adalva", 1, "x"));
        assert_eq!(archive.students().collect::<Vec<_>>(), vec!["Adalva", "Thayse"]);
    }

    #[test]
    fn serializes_as_plain_mapping() {
        let mut archive = ParecerArchive::new();
        archive.append(record("João", 1, "ótimo"));
        let value = serde_json::to_value(&archive).unwrap();
        assert_eq!(value["João"][0]["id"], 1);
        assert_eq!(value["João"][0]["parecer_texto"], "ótimo");
    }
}
