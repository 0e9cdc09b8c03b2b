// ==========================================
// 储煤场自燃风险预测系统 - CLI 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统
// ==========================================

use anyhow::Context;
use chrono::NaiveDate;
use coal_fire_predictor::api::{DashboardApi, ForecastApi};
use coal_fire_predictor::config::{AppConfig, MetricsReport};
use coal_fire_predictor::db;
use coal_fire_predictor::engine::{ForecastRepositories, HeuristicScorer};
use coal_fire_predictor::importer::{DataImporter, DataKind};
use coal_fire_predictor::logging;
use coal_fire_predictor::repository::{
    SqliteCoalPileRepository, SqliteFireIncidentRepository, SqlitePredictionRepository,
    SqliteTemperatureRepository, SqliteWeatherRepository,
};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig::from_env();
    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", coal_fire_predictor::APP_NAME);
    tracing::info!("系统版本: {}", coal_fire_predictor::VERSION);
    tracing::info!("使用数据库: {}", config.db_path);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "help".to_string());

    match command.as_str() {
        "init-db" => {
            let conn = db::open_sqlite_connection(&config.db_path)
                .context("无法打开数据库")?;
            db::init_schema(&conn).context("schema 初始化失败")?;
            println!("数据库初始化完成: {}", config.db_path);
        }

        "import" => {
            let kind_arg = args.next().context("缺少数据类型参数 (supplies/temperatures/fires/weather)")?;
            let path_arg = args.next().context("缺少 CSV 文件路径参数")?;
            let kind = DataKind::from_str(&kind_arg)?;

            let repos = build_repositories(&config.db_path)?;
            let importer = DataImporter::new(
                repos.pile_repo.clone(),
                repos.temperature_repo.clone(),
                repos.fire_repo.clone(),
                repos.weather_repo.clone(),
            );
            let summary = importer
                .import_csv(std::path::Path::new(&path_arg), kind)
                .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        "forecast" => {
            let reference_date = parse_date_arg(args.next())?;
            let repos = build_repositories(&config.db_path)?;
            let api = build_forecast_api(&config, repos);
            let forecasts = api.run_forecast(reference_date).await?;
            println!("{}", serde_json::to_string_pretty(&forecasts)?);
        }

        "evaluate" => {
            let start_date = parse_date_arg(args.next())?;
            let end_date = parse_date_arg(args.next())?;
            let repos = build_repositories(&config.db_path)?;
            let api = build_forecast_api(&config, repos);
            let report = api.evaluate_quality(start_date, end_date).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        "dashboard" => {
            let reference_date = parse_date_arg(args.next())?;
            let repos = build_repositories(&config.db_path)?;
            let api = DashboardApi::new(repos);
            let overview = api.get_overview(reference_date).await?;
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }

        "history" => {
            let pile_id: i64 = args
                .next()
                .context("缺少煤堆编号参数")?
                .parse()
                .context("煤堆编号必须是整数")?;
            let reference_date = parse_date_arg(args.next())?;
            let repos = build_repositories(&config.db_path)?;
            let api = DashboardApi::new(repos);
            let history = api.get_pile_history(pile_id, reference_date).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }

        _ => print_usage(),
    }

    Ok(())
}

/// 基于共享连接构建全部仓储
fn build_repositories(db_path: &str) -> anyhow::Result<ForecastRepositories> {
    let conn = db::open_sqlite_connection(db_path).context("无法打开数据库")?;

    if db::read_schema_version(&conn)?.is_none() {
        tracing::warn!("数据库 schema 未初始化, 请先执行 init-db");
    }

    let conn = Arc::new(Mutex::new(conn));
    Ok(ForecastRepositories::new(
        Arc::new(SqliteCoalPileRepository::from_connection(conn.clone())),
        Arc::new(SqliteTemperatureRepository::from_connection(conn.clone())),
        Arc::new(SqliteFireIncidentRepository::from_connection(conn.clone())),
        Arc::new(SqliteWeatherRepository::from_connection(conn.clone())),
        Arc::new(SqlitePredictionRepository::from_connection(conn)),
    ))
}

/// 构建预测/评估 API (基线评分器 + 静态指标报告)
fn build_forecast_api(config: &AppConfig, repos: ForecastRepositories) -> ForecastApi {
    let pr_auc = MetricsReport::load_pr_auc(&config.metrics_report_path);
    ForecastApi::new(
        repos,
        Arc::new(HeuristicScorer::new()),
        config.model_version.clone(),
        pr_auc,
    )
}

/// 解析可选的日期参数 (YYYY-MM-DD)
fn parse_date_arg(arg: Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    match arg {
        None => Ok(None),
        Some(value) => {
            let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .with_context(|| format!("无法解析日期参数: {}", value))?;
            Ok(Some(date))
        }
    }
}

fn print_usage() {
    println!("使用方法:");
    println!("  coal-fire-predictor init-db                          初始化数据库");
    println!("  coal-fire-predictor import <类型> <CSV文件>          导入数据 (supplies/temperatures/fires/weather)");
    println!("  coal-fire-predictor forecast [YYYY-MM-DD]            执行批量风险预测");
    println!("  coal-fire-predictor evaluate [起始日期] [结束日期]   回溯评估模型质量");
    println!("  coal-fire-predictor dashboard [YYYY-MM-DD]           查询全场总览");
    println!("  coal-fire-predictor history <煤堆编号> [YYYY-MM-DD]  查询单煤堆历史");
    println!();
    println!("环境变量:");
    println!("  COAL_FIRE_DB_PATH        数据库路径");
    println!("  COAL_FIRE_MODEL_VERSION  模型版本号 (默认 v1.0)");
    println!("  COAL_FIRE_METRICS_PATH   模型指标报告路径 (默认 ml/metrics.json)");
    println!("  RUST_LOG                 日志级别 (默认 info)");
}
