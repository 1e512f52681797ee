use serde::Serialize;
use sqlx::SqlitePool;
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

use crate::db::{Region, RegionRef, RegionRepository, StatRepository, StoredCell, TableKind};
use crate::services::{RegionResolver, StatError};

/// One entry of an `all_years` series: the year and what the lookup returned
#[derive(Debug)]
pub struct YearValue {
    pub year: i32,
    pub value: Result<f64, StatError>,
}

/// Per-region means of two data points across all stored years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionComparison {
    pub region_code: i64,
    pub region_name: String,
    pub comparator_mean: f64,
    pub value_mean: f64,
}

/// Point lookups and multi-year aggregates over the normalized store
#[derive(Clone)]
pub struct StatService {
    stat_repo: StatRepository,
    resolver: RegionResolver,
}

impl StatService {
    pub fn new(pool: SqlitePool, verify_region_codes: bool) -> Self {
        Self {
            stat_repo: StatRepository::new(pool.clone()),
            resolver: RegionResolver::new(RegionRepository::new(pool), verify_region_codes),
        }
    }

    pub fn resolver(&self) -> &RegionResolver {
        &self.resolver
    }

    /// Value of `data_point` for `region` in `year`.
    ///
    /// The data point is checked against the table's column set before any
    /// query naming it is built.
    #[instrument(skip(self))]
    pub async fn lookup(
        &self,
        kind: TableKind,
        year: i32,
        region: &RegionRef,
        data_point: &str,
    ) -> Result<f64, StatError> {
        let mut conn = self.stat_repo.acquire().await?;

        let region_code = self.resolver.resolve_on(&mut conn, region).await?;

        let columns = self.stat_repo.data_columns(&mut conn, kind).await?;
        if columns.is_empty() {
            return Err(StatError::TableNotLoaded { kind });
        }
        if !columns.iter().any(|c| c == data_point) {
            return Err(StatError::UnknownDataPoint {
                kind,
                name: data_point.to_string(),
            });
        }

        let mut cells = self
            .stat_repo
            .find_cells(&mut conn, kind, year, &region_code.to_string(), data_point)
            .await?;

        match cells.len() {
            0 => Err(StatError::NoDataFound { year, region_code }),
            1 => {
                let cell = cells.remove(0);
                numeric_value(cell, data_point, year, region_code)
            }
            _ => Err(StatError::DuplicateObservation { year, region_code }),
        }
    }

    /// Mean of `data_point` over `years`. Years whose lookup fails are skipped.
    #[instrument(skip(self))]
    pub async fn average(
        &self,
        kind: TableKind,
        years: &[i32],
        region: &RegionRef,
        data_point: &str,
    ) -> Result<f64, StatError> {
        let mut values = Vec::with_capacity(years.len());

        for &year in years {
            match self.lookup(kind, year, region, data_point).await {
                Ok(value) => values.push(value),
                Err(e) => debug!("No observation for {}: {}", year, e),
            }
        }

        mean(&values).ok_or(StatError::NoValidData)
    }

    /// One lookup per distinct stored year, ascending. Failures stay in the
    /// series so callers can see the gaps.
    #[instrument(skip(self))]
    pub async fn all_years(
        &self,
        kind: TableKind,
        region: &RegionRef,
        data_point: &str,
    ) -> Result<Vec<YearValue>, StatError> {
        let years = {
            let mut conn = self.stat_repo.acquire().await?;
            if self.stat_repo.data_columns(&mut conn, kind).await?.is_empty() {
                return Err(StatError::TableNotLoaded { kind });
            }
            self.stat_repo.distinct_years(&mut conn, kind).await?
        };

        let mut series = Vec::with_capacity(years.len());
        for year in years {
            let value = self.lookup(kind, year, region, data_point).await;
            series.push(YearValue { year, value });
        }

        Ok(series)
    }

    /// For every registered region, the mean of `comparator` and of
    /// `data_point` over all stored years, sorted by the comparator mean.
    /// Regions lacking either mean are left out.
    #[instrument(skip(self))]
    pub async fn compare_regions(
        &self,
        kind: TableKind,
        comparator: &str,
        data_point: &str,
    ) -> Result<Vec<RegionComparison>, StatError> {
        let regions = self.resolver.regions().await?;
        let mut comparisons = Vec::with_capacity(regions.len());

        for Region { code, name } in regions {
            let region = RegionRef::Code(code);
            let comparator_mean = series_mean(&self.all_years(kind, &region, comparator).await?);
            let value_mean = series_mean(&self.all_years(kind, &region, data_point).await?);

            match (comparator_mean, value_mean) {
                (Some(comparator_mean), Some(value_mean)) => comparisons.push(RegionComparison {
                    region_code: code,
                    region_name: name,
                    comparator_mean,
                    value_mean,
                }),
                _ => debug!("Region {} has no usable data, skipping", code),
            }
        }

        comparisons.sort_by(|a, b| {
            a.comparator_mean
                .partial_cmp(&b.comparator_mean)
                .unwrap_or(Ordering::Equal)
        });

        info!("Compared {} regions", comparisons.len());
        Ok(comparisons)
    }

    pub async fn resolve_region_name(&self, code: i64) -> Result<String, StatError> {
        self.resolver.resolve_region_name(code).await
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>, StatError> {
        self.resolver.regions().await
    }
}

fn numeric_value(
    cell: StoredCell,
    data_point: &str,
    year: i32,
    region_code: i64,
) -> Result<f64, StatError> {
    let missing = || StatError::MissingValue {
        data_point: data_point.to_string(),
        year,
        region_code,
    };

    let non_numeric = |value: String| StatError::NonNumericValue {
        data_point: data_point.to_string(),
        value,
    };

    let value = match cell.storage.as_str() {
        "integer" | "real" => cell.number.ok_or_else(missing)?,
        "text" => {
            let text = cell.text.ok_or_else(missing)?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(missing());
            }
            match trimmed.parse::<f64>() {
                Ok(n) => n,
                Err(_) => return Err(non_numeric(text)),
            }
        }
        "null" => return Err(missing()),
        _ => return Err(non_numeric(cell.text.unwrap_or_default())),
    };

    // A NaN cell reads as a missing observation
    if value.is_nan() {
        Err(missing())
    } else if value.is_infinite() {
        Err(non_numeric(value.to_string()))
    } else {
        Ok(value)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn series_mean(series: &[YearValue]) -> Option<f64> {
    let values: Vec<f64> = series
        .iter()
        .filter_map(|entry| entry.value.as_ref().ok().copied())
        .collect();
    mean(&values)
}
