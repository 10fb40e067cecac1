//! 文件名清洗
//!
//! 模板文件名和下载文件名共用同一个函数，保证两处结果逐字节一致

use unicode_normalization::UnicodeNormalization;

/// 把学生姓名转换为可用于文件名的标记
///
/// 处理顺序：去除首尾空白 → 小写 → NFD 分解并丢弃非 ASCII 字符（去掉重音符号）
/// → 空格替换为下划线 → 只保留 ASCII 字母、数字和下划线
///
/// # 示例
/// ```
/// use parecer_gen::utils::sanitize;
/// assert_eq!(sanitize("João da Silva"), "joao_da_silva");
/// ```
pub fn sanitize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(char::is_ascii)
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
