//! docx 文件包 - 基础设施层
//!
//! 持有 docx 压缩包的全部条目，只暴露"读/换/写部件"的能力，不认识占位符

use std::io::{Cursor, Read, Write};
use std::path::Path;

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::word_xml::WordXml;
use crate::error::{AppError, AppResult};

/// 正文部件
pub const DOCUMENT_PART: &str = "word/document.xml";

/// docx 结构错误
#[derive(Debug, Error)]
pub enum DocxError {
    /// 缺少必需部件
    #[error("docx 缺少部件: {name}")]
    MissingPart { name: String },
    /// 部件不是合法的 UTF-8
    #[error("部件 {name} 不是 UTF-8 文本")]
    NotUtf8 { name: String },
}

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// 内存中的 docx 文件包
///
/// 保留原有条目顺序，写回时统一使用 Deflate 压缩
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// 从磁盘打开模板
    pub fn open(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(AppError::render)?;
        Self::from_bytes(&bytes)
    }

    /// 从字节解析
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(AppError::render)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                data,
            });
        }

        Ok(Self { entries })
    }

    /// 由 (名称, 内容) 列表构建
    pub fn from_parts<I, N, D>(parts: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<Vec<u8>>,
    {
        let entries = parts
            .into_iter()
            .map(|(name, data)| PackageEntry {
                name: name.into(),
                data: data.into(),
                is_dir: false,
            })
            .collect();
        Self { entries }
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// 替换部件内容，不存在时追加
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
                is_dir: false,
            }),
        }
    }

    /// 正文 XML
    pub fn document_xml(&self) -> AppResult<String> {
        let data = self.part(DOCUMENT_PART).ok_or_else(|| {
            AppError::render(DocxError::MissingPart {
                name: DOCUMENT_PART.to_string(),
            })
        })?;
        String::from_utf8(data.to_vec()).map_err(|_| {
            AppError::render(DocxError::NotUtf8 {
                name: DOCUMENT_PART.to_string(),
            })
        })
    }

    /// 正文中每个段落的文本
    pub fn paragraph_texts(&self) -> AppResult<Vec<String>> {
        let xml = self.document_xml()?;
        WordXml::new()?
            .paragraph_texts(&xml)
            .map_err(AppError::render)
    }

    /// 序列化为 docx 字节
    pub fn to_bytes(&self) -> AppResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.clone(), opts)?;
            } else {
                zip.start_file(entry.name.clone(), opts)?;
                zip.write_all(&entry.data).map_err(AppError::render)?;
            }
        }

        Ok(zip.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Olá</w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn zip_roundtrip_keeps_parts_and_order() {
        let package = DocxPackage::from_parts([
            ("[Content_Types].xml", b"<Types/>".to_vec()),
            (DOCUMENT_PART, DOC.as_bytes().to_vec()),
        ]);
        let bytes = package.to_bytes().unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let reopened = DocxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.part("[Content_Types].xml"), Some(&b"<Types/>"[..]));
        assert_eq!(reopened.document_xml().unwrap(), DOC);
        assert_eq!(reopened.entries[0].name, "[Content_Types].xml");
        assert_eq!(reopened.paragraph_texts().unwrap(), vec!["Olá"]);
    }

    #[test]
    fn missing_document_part_is_a_render_error() {
        let package = DocxPackage::from_parts([("[Content_Types].xml", b"<Types/>".to_vec())]);
        assert!(matches!(package.document_xml(), Err(AppError::Render { .. })));
    }

    #[test]
    fn garbage_bytes_are_a_render_error() {
        assert!(matches!(
            DocxPackage::from_bytes(b"not a zip"),
            Err(AppError::Render { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DocxPackage::open(&dir.path().join("nada.docx")),
            Err(AppError::Render { .. })
        ));
    }
}
