//! 评语存储服务 - 业务能力层
//!
//! 只负责"整体读/整体写数据文件"能力，不关心表单和模板

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::ParecerArchive;

/// 评语存储
///
/// 数据文件为 UTF-8 JSON，四空格缩进，非 ASCII 字符原样写出。
/// 没有文件锁：两个进程同时保存时以后写入者为准。
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部评语
    ///
    /// 文件不存在时返回空集合；文件存在但无法解析时返回 `DataFormat`
    pub fn load(&self) -> AppResult<ParecerArchive> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("📭 数据文件不存在，使用空记录: {}", self.path.display());
                return Ok(ParecerArchive::new());
            }
            Err(e) => return Err(AppError::file_read_failed(&self.path, e)),
        };

        let archive: ParecerArchive =
            serde_json::from_slice(&bytes).map_err(|source| AppError::DataFormat {
                path: self.path.clone(),
                source,
            })?;
        debug!("已加载 {} 名学生的评语", archive.len());
        Ok(archive)
    }

    /// 覆盖写入全部评语
    ///
    /// 先写同目录下的临时文件再改名，避免中途崩溃留下截断的数据文件
    pub fn save(&self, archive: &ParecerArchive) -> AppResult<()> {
        let content = serialize(archive)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AppError::file_write_failed(parent, e))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, &content).map_err(|e| AppError::file_write_failed(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!("无法删除临时文件 {}: {}", tmp.display(), cleanup);
            }
            return Err(AppError::file_write_failed(&self.path, e));
        }

        debug!("已保存 {} 字节到 {}", content.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("pareceres.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn serialize(archive: &ParecerArchive) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    archive
        .serialize(&mut ser)
        .map_err(|source| FileError::SerializeFailed { source })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvaluationRecord;

    fn record(student: &str, id: u32) -> EvaluationRecord {
        EvaluationRecord {
            id,
            student_name: student.to_string(),
            mother_name: "Damiana".to_string(),
            father_name: "Nelson".to_string(),
            address: "Rua São João, 45".to_string(),
            birthplace: "Bom Conselho".to_string(),
            birth_date: "12/12/2014".to_string(),
            period: "3º".to_string(),
            shift: "Manhã".to_string(),
            evaluation_text: "Lê com fluência.\nEscreve frases.".to_string(),
            observation: "Acompanhar ortografia".to_string(),
            created_at: "2024-06-10 09:30:00".to_string(),
            did_not_attend: false,
            document_hex: Some(hex::encode([0x50, 0x4b, 0x03, 0x04, 0xff])),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("pareceres.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("data").join("pareceres.json"));

        let mut archive = ParecerArchive::new();
        archive.append(record("Ana", 1));
        archive.append(record("Ana", 2));
        archive.append(record("João Conceição", 1));
        store.save(&archive).unwrap();

        assert_eq!(store.load().unwrap(), archive);
        assert!(!dir.path().join("data").join("pareceres.json.tmp").exists());
    }

    #[test]
    fn writes_readable_utf8_with_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("pareceres.json"));

        let mut archive = ParecerArchive::new();
        archive.append(record("João Conceição", 1));
        store.save(&archive).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"João Conceição\""));
        assert!(content.contains("Manhã"));
        assert!(!content.contains("\\u"));
        assert!(content.contains("\n    \"João Conceição\": ["));
    }

    #[test]
    fn unparseable_file_is_a_data_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pareceres.json");
        fs::write(&path, "{ \"Ana\": [ {\"id\": ").unwrap();

        let err = RecordStore::new(&path).load().unwrap_err();
        assert!(matches!(err, AppError::DataFormat { .. }));
        // 文件保持原样
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"Ana\": [ {\"id\": ");
    }
}
