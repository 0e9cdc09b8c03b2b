// ==========================================
// 储煤场自燃风险预测系统 - 导入层错误类型
// ==========================================
// 职责: CSV 导入过程的错误分类
// 约束: 行级错误必须带行号, 便于现场排查数据文件
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV 读取失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("第 {line} 行数据错误: {message}")]
    RowError { line: usize, message: String },

    #[error("未知的数据类型: {0} (支持 supplies/temperatures/fires/weather)")]
    UnknownDataKind(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
