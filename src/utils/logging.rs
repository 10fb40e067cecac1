/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 `debug` 或 `info` 级别。
/// 重复调用时保留第一次安装的订阅者。
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 评语生成系统启动");
    info!("📁 数据文件: {}", config.data_file.display());
    info!("📄 模板模式: {}", config.template_mode);
    info!("{}", "=".repeat(60));
}

/// 记录评语保存完成信息
///
/// # 参数
/// - `student`: 学生姓名
/// - `id`: 新评语编号
/// - `size`: 文档字节数
pub fn log_submit_complete(student: &str, id: u32, size: usize) {
    info!("{}", "─".repeat(60));
    info!("✅ 评语已生成并保存: {} #{} ({} 字节)", student, id, size);
    info!("{}", "─".repeat(60));
}

/// 评语正文的单行预览，换行折叠为空格，超过 `max_chars` 个字符时截断
pub fn text_preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.split_whitespace().flat_map(|word| word.chars().chain([' ']));
    let mut preview: String = chars.by_ref().take(max_chars).collect();
    let truncated = chars.any(|c| c != ' ');
    let trimmed_len = preview.trim_end().len();
    preview.truncate(trimmed_len);
    if truncated {
        preview.push('…');
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_single_line_and_bounded() {
        assert_eq!(text_preview("Conceição", 6), "Concei…");
        assert_eq!(text_preview("Ana", 6), "Ana");
        assert_eq!(text_preview("Linha 1\n\nLinha 2", 40), "Linha 1 Linha 2");
        assert_eq!(text_preview("abc def", 4), "abc…");
        assert_eq!(text_preview("", 4), "");
    }
}
