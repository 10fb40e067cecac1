//! 下载文件名约定

use chrono::NaiveDateTime;

use crate::utils::sanitize;

/// 新生成文档的下载文件名：`parecer_{姓名}_{YYYYMMDD_HHMMSS}.docx`
pub fn fresh_download_name(student: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "parecer_{}_{}.docx",
        sanitize(student),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// 历史记录的下载文件名
///
/// 存储的时间戳中空格替换为下划线、冒号删除，`index` 为该记录在学生列表中的位置（从 0 开始）
pub fn archived_download_name(student: &str, stored_timestamp: &str, index: usize) -> String {
    let stamp = stored_timestamp.replace(' ', "_").replace(':', "");
    format!("parecer_{}_{}_{}.docx", sanitize(student), stamp, index)
}
