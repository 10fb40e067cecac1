use std::path::{Path, PathBuf};
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据文件存在但无法解析
    #[error("数据文件格式错误 ({}): {source}", .path.display())]
    DataFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 所有候选模板均不存在
    #[error("找不到模板文件，已尝试: {}", display_paths(.searched))]
    TemplateNotFound { searched: Vec<PathBuf> },

    /// 打开、替换或序列化模板时失败
    #[error("生成文档失败: {source}")]
    Render {
        #[source]
        source: BoxedSource,
    },

    /// 存储的十六进制文档数据无法解码
    #[error("评语 {} 的文档数据已损坏 (学生: {student}): {source}", .index + 1)]
    CorruptedPayload {
        student: String,
        index: usize,
        #[source]
        source: hex::FromHexError,
    },

    /// 表单校验失败
    #[error("表单错误: {0}")]
    Validation(#[from] FormError),

    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 表单校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// 未选择学生
    #[error("请选择一名学生")]
    MissingStudent,
    /// 未填写评语且未标记缺勤
    #[error("学生 {student} 未标记为缺勤时必须填写评语")]
    MissingEvaluation { student: String },
    /// 学生不在名册中
    #[error("学生 {student} 不在名册中")]
    UnknownStudent { student: String },
    /// 出生日期格式错误
    #[error("无法解析出生日期: {value}")]
    InvalidBirthDate { value: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化数据失败: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },
    /// 找不到记录
    #[error("学生 {student} 没有第 {} 条评语", .index + 1)]
    RecordNotFound { student: String, index: usize },
    /// 评语没有保存文档
    #[error("学生 {student} 的第 {} 条评语没有保存文档", .index + 1)]
    DocumentMissing { student: String, index: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文档生成错误
    pub fn render(source: impl Into<BoxedSource>) -> Self {
        AppError::Render {
            source: source.into(),
        }
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// 是否为模板缺失错误
    pub fn is_template_not_found(&self) -> bool {
        matches!(self, AppError::TemplateNotFound { .. })
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::render(err)
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::render(err)
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
