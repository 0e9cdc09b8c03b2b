// ==========================================
// 储煤场自燃风险预测系统 - 模型静态指标报告
// ==========================================
// 职责: 读取模型侧训练产物 metrics.json (只读透传)
// 约束: 报告缺失不是错误, 由评估引擎使用兜底常量
// ==========================================

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// 模型侧静态指标报告
///
/// 由数据科学侧离线训练产出, 本系统只读不写。
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsReport {
    /// 离线评估的 PR-AUC
    #[serde(default)]
    pub pr_auc: Option<f64>,
}

impl MetricsReport {
    /// 从 JSON 文件加载报告
    ///
    /// # 返回
    /// - Some(MetricsReport): 读取并解析成功
    /// - None: 文件缺失或格式非法（不视为错误）
    pub fn load(path: &Path) -> Option<MetricsReport> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                debug!(path = %path.display(), %error, "模型指标报告不可读");
                return None;
            }
        };

        match serde_json::from_str::<MetricsReport>(&content) {
            Ok(report) => Some(report),
            Err(error) => {
                debug!(path = %path.display(), %error, "模型指标报告解析失败");
                None
            }
        }
    }

    /// 便捷读取: 直接取 PR-AUC 值
    pub fn load_pr_auc(path: &Path) -> Option<f64> {
        Self::load(path)?.pr_auc
    }
}
