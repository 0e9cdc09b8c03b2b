// ==========================================
// 储煤场自燃风险预测系统 - CSV 数据导入器
// ==========================================
// 职责: 解析四类数据文件并写入仓储
// 文件类型: supplies(入库) / temperatures(测温) / fires(火情) / weather(逐时气象)
// 约束: 行级解析失败即中止本次导入, 不做部分写入
// ==========================================

use crate::domain::fire::FireIncident;
use crate::domain::observation::{TemperatureReading, WeatherDaily};
use crate::domain::pile::CoalPile;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{
    CoalPileRepository, FireIncidentRepository, TemperatureRepository, WeatherRepository,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// DataKind - 数据文件类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Supplies,     // 入库台账
    Temperatures, // 测温台账
    Fires,        // 火情台账
    Weather,      // 逐时气象
}

impl DataKind {
    /// 从字符串解析数据类型
    pub fn from_str(s: &str) -> ImportResult<Self> {
        match s.to_lowercase().as_str() {
            "supplies" => Ok(DataKind::Supplies),
            "temperatures" => Ok(DataKind::Temperatures),
            "fires" => Ok(DataKind::Fires),
            "weather" => Ok(DataKind::Weather),
            other => Err(ImportError::UnknownDataKind(other.to_string())),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Supplies => write!(f, "supplies"),
            DataKind::Temperatures => write!(f, "temperatures"),
            DataKind::Fires => write!(f, "fires"),
            DataKind::Weather => write!(f, "weather"),
        }
    }
}

/// 单次导入结果摘要
#[derive(Debug, Clone, serde::Serialize)]
pub struct ImportSummary {
    pub batch_id: String, // 导入批次号
    pub inserted: usize,  // 写入记录数
}

// ==========================================
// DataImporter - CSV 数据导入器
// ==========================================
pub struct DataImporter {
    pile_repo: Arc<dyn CoalPileRepository>,
    temperature_repo: Arc<dyn TemperatureRepository>,
    fire_repo: Arc<dyn FireIncidentRepository>,
    weather_repo: Arc<dyn WeatherRepository>,
}

impl DataImporter {
    /// 构造函数
    pub fn new(
        pile_repo: Arc<dyn CoalPileRepository>,
        temperature_repo: Arc<dyn TemperatureRepository>,
        fire_repo: Arc<dyn FireIncidentRepository>,
        weather_repo: Arc<dyn WeatherRepository>,
    ) -> Self {
        Self {
            pile_repo,
            temperature_repo,
            fire_repo,
            weather_repo,
        }
    }

    /// 导入一个 CSV 数据文件
    ///
    /// # 参数
    /// - path: 文件路径
    /// - kind: 数据类型
    ///
    /// # 返回
    /// - Ok(ImportSummary): 批次号与写入记录数
    /// - Err(ImportError): 解析或写入失败（本次导入中止）
    pub async fn import_csv(&self, path: &Path, kind: DataKind) -> ImportResult<ImportSummary> {
        let batch_id = Uuid::new_v4().to_string();
        info!(%batch_id, %kind, path = %path.display(), "开始导入数据文件");

        let inserted = match kind {
            DataKind::Supplies => self.import_supplies(path).await?,
            DataKind::Temperatures => self.import_temperatures(path).await?,
            DataKind::Fires => self.import_fires(path).await?,
            DataKind::Weather => self.import_weather(path).await?,
        };

        info!(%batch_id, inserted, "数据文件导入完成");
        Ok(ImportSummary { batch_id, inserted })
    }

    /// 导入入库台账 (每行一条入库记录)
    async fn import_supplies(&self, path: &Path) -> ImportResult<usize> {
        #[derive(Deserialize)]
        struct SupplyRow {
            pile_id: i64,
            warehouse_id: i64,
            coal_type: String,
            unloading_date: NaiveDate,
            to_warehouse_ton: f64,
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut piles = Vec::new();
        for (index, result) in reader.deserialize::<SupplyRow>().enumerate() {
            let row = result.map_err(|e| row_error(index, e))?;
            piles.push(CoalPile {
                pile_id: row.pile_id,
                coal_type: row.coal_type,
                formation_date: row.unloading_date,
                initial_volume_tonnes: row.to_warehouse_ton,
                warehouse_id: row.warehouse_id,
            });
        }

        for pile in &piles {
            self.pile_repo.save(pile).await?;
        }
        Ok(piles.len())
    }

    /// 导入测温台账
    async fn import_temperatures(&self, path: &Path) -> ImportResult<usize> {
        #[derive(Deserialize)]
        struct TemperatureRow {
            pile_id: i64,
            warehouse_id: i64,
            measurement_date: NaiveDate,
            temperature: f64,
            picket: Option<String>,
            shift: Option<i64>,
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut readings = Vec::new();
        for (index, result) in reader.deserialize::<TemperatureRow>().enumerate() {
            let row = result.map_err(|e| row_error(index, e))?;
            readings.push(TemperatureReading {
                pile_id: row.pile_id,
                warehouse_id: row.warehouse_id,
                measurement_date: row.measurement_date,
                temperature: row.temperature,
                picket: row.picket.filter(|p| !p.is_empty()),
                shift: row.shift,
            });
        }

        Ok(self.temperature_repo.save_batch(&readings).await?)
    }

    /// 导入火情台账 (日期字段兼容带时间与不带时间两种格式)
    async fn import_fires(&self, path: &Path) -> ImportResult<usize> {
        #[derive(Deserialize)]
        struct FireRow {
            pile_id: i64,
            warehouse_id: i64,
            document_date: String,
            fire_start_date: String,
            weight_act: f64,
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut incidents = Vec::new();
        for (index, result) in reader.deserialize::<FireRow>().enumerate() {
            let row = result.map_err(|e| row_error(index, e))?;
            let document_date = parse_date_flexible(&row.document_date)
                .ok_or_else(|| bad_date(index, &row.document_date))?;
            let actual_date = parse_date_flexible(&row.fire_start_date)
                .ok_or_else(|| bad_date(index, &row.fire_start_date))?;
            incidents.push(FireIncident {
                pile_id: row.pile_id,
                warehouse_id: row.warehouse_id,
                actual_date,
                document_date,
                weight_act: row.weight_act,
            });
        }

        Ok(self.fire_repo.save_batch(&incidents).await?)
    }

    /// 导入逐时气象数据并聚合为逐日均值
    async fn import_weather(&self, path: &Path) -> ImportResult<usize> {
        #[derive(Deserialize)]
        struct WeatherRow {
            date: String,
            t: f64,
            humidity: f64,
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut hourly = Vec::new();
        for (index, result) in reader.deserialize::<WeatherRow>().enumerate() {
            let row = result.map_err(|e| row_error(index, e))?;
            let timestamp = NaiveDateTime::parse_from_str(&row.date, "%Y-%m-%d %H:%M:%S")
                .map_err(|_| bad_date(index, &row.date))?;
            hourly.push((timestamp.date(), row.t, row.humidity));
        }

        let daily = aggregate_daily(hourly);
        Ok(self.weather_repo.save_batch(&daily).await?)
    }
}

/// 逐时气象聚合为逐日均值
fn aggregate_daily(hourly: Vec<(NaiveDate, f64, f64)>) -> Vec<WeatherDaily> {
    let mut daily: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for (date, temperature, humidity) in hourly {
        let entry = daily.entry(date).or_default();
        entry.0.push(temperature);
        entry.1.push(humidity);
    }

    daily
        .into_iter()
        .map(|(date, (temps, humidities))| WeatherDaily {
            date,
            air_temperature: temps.iter().sum::<f64>() / temps.len() as f64,
            humidity: humidities.iter().sum::<f64>() / humidities.len() as f64,
        })
        .collect()
}

/// 解析日期, 兼容 "%Y-%m-%d %H:%M:%S" 与 "%Y-%m-%d" 两种格式
fn parse_date_flexible(value: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(timestamp.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// 行级错误 (CSV 数据行号从第 2 行开始, 第 1 行为表头)
fn row_error(index: usize, error: csv::Error) -> ImportError {
    ImportError::RowError {
        line: index + 2,
        message: error.to_string(),
    }
}

fn bad_date(index: usize, value: &str) -> ImportError {
    ImportError::RowError {
        line: index + 2,
        message: format!("无法识别的日期: {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_flexible_accepts_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        assert_eq!(parse_date_flexible("2025-11-20"), Some(expected));
        assert_eq!(parse_date_flexible("2025-11-20 08:30:00"), Some(expected));
        assert_eq!(parse_date_flexible("20.11.2025"), None);
    }

    #[test]
    fn aggregate_daily_averages_per_day() {
        let day1 = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
        let daily = aggregate_daily(vec![
            (day1, 10.0, 80.0),
            (day1, 14.0, 60.0),
            (day2, -2.0, 90.0),
        ]);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, day1);
        assert!((daily[0].air_temperature - 12.0).abs() < 1e-9);
        assert!((daily[0].humidity - 70.0).abs() < 1e-9);
        assert_eq!(daily[1].date, day2);
        assert!((daily[1].air_temperature + 2.0).abs() < 1e-9);
    }

    #[test]
    fn data_kind_parsing() {
        assert_eq!(DataKind::from_str("supplies").unwrap(), DataKind::Supplies);
        assert_eq!(DataKind::from_str("WEATHER").unwrap(), DataKind::Weather);
        assert!(DataKind::from_str("excel").is_err());
    }
}
