//! 基础设施层：docx 文件包与段落 XML 处理

pub mod docx_package;
pub mod word_xml;

pub use docx_package::{DocxError, DocxPackage, DOCUMENT_PART};
pub use word_xml::{Paragraph, WordXml, WordXmlError};
