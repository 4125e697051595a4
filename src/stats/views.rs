//! Aggregation Views Module
//! Read-only projections of the filtered tables that feed the dashboard
//! tabs. Every view tolerates an empty table and returns empty results.

use super::calculator::{BoxSummary, StatsCalculator};
use crate::data::schema::{
    COMPARED_TO_NATIONAL, FACILITY_ID, FACILITY_NAME, MEASURE_NAME, NUMBER_OF_PATIENTS,
    NUMBER_OF_PATIENTS_RETURNED, SCORE, STATE,
};
use crate::data::{DataProcessor, ProcessorError, Selection};
use crate::taxonomy::{
    benchmark_config, perf_rank, BenchmarkConfig, BenchmarkCounter, MeasureGroup, NOT_AVAILABLE,
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Rows listed in the high-volume contributor table.
pub const TOP_CONTRIBUTORS: usize = 15;
/// Hospitals listed in each ranking table.
pub const RANKING_SIZE: usize = 10;

const CATEGORY: &str = "Compared to National Display";
const HOSPITALS: &str = "Hospitals";
const PERFORMANCE: &str = "Performance";
const AVERAGE_SCORE: &str = "Average Score";
const ROWS: &str = "Rows";

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Headline numbers for the KPI row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub hospitals: usize,
    pub measures: usize,
    pub rows: usize,
    pub scored_rows: usize,
    /// Share of rows carrying a score, in `[0, 1]`. Zero for an empty table.
    pub coverage: f64,
    /// Mean of present scores; `None` is shown as "N/A".
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePoint {
    pub facility_name: Option<String>,
    pub state: Option<String>,
    pub score: f64,
    /// Left absent when missing; only the performance view substitutes a label.
    pub compared_to_national: Option<String>,
}

/// Scored rows of one measure and their box-plot summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureDistribution {
    pub measure: String,
    pub points: Vec<ScorePoint>,
    pub summary: BoxSummary,
}

impl MeasureDistribution {
    /// Points split by their "Compared to National" category.
    pub fn by_category(&self) -> Vec<(Option<&str>, Vec<f64>)> {
        let mut split: Vec<(Option<&str>, Vec<f64>)> = Vec::new();
        for point in &self.points {
            let key = point.compared_to_national.as_deref();
            match split.iter_mut().find(|(k, _)| *k == key) {
                Some((_, scores)) => scores.push(point.score),
                None => split.push((key, vec![point.score])),
            }
        }
        split.sort_by_key(|(k, _)| k.map(perf_rank).unwrap_or(usize::MAX));
        split
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceCount {
    pub measure: String,
    pub category: String,
    pub hospitals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    pub facility_name: Option<String>,
    pub state: Option<String>,
    pub patients: f64,
    pub score: f64,
    /// Patients returned when reported, otherwise the patient count.
    pub bubble_size: f64,
    pub compared_to_national: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VolumeView {
    /// Only EDAC measures carry patient volumes.
    NotApplicable,
    Available {
        points: Vec<VolumePoint>,
        top_contributors: Vec<VolumePoint>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAverage {
    pub state: String,
    pub average_score: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHospital {
    pub facility_name: Option<String>,
    pub state: Option<String>,
    pub measure: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Rankings {
    /// Highest scores first.
    pub lowest_performing: Vec<RankedHospital>,
    /// Lowest scores first.
    pub best_performing: Vec<RankedHospital>,
}

/// One (state, measure) row of the benchmark summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub state: Option<String>,
    pub measure: Option<String>,
    pub counts: Vec<(BenchmarkCounter, Option<i64>)>,
}

impl BenchmarkRow {
    pub fn count(&self, counter: BenchmarkCounter) -> Option<i64> {
        self.counts
            .iter()
            .find(|(c, _)| *c == counter)
            .and_then(|(_, n)| *n)
    }

    /// Sum of the present counters.
    pub fn total(&self) -> i64 {
        self.counts.iter().filter_map(|(_, n)| *n).sum()
    }
}

/// Long-form benchmark entry, one per row and counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    pub state: Option<String>,
    pub measure: Option<String>,
    pub performance: BenchmarkCounter,
    pub hospitals: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBenchmark {
    pub config: &'static BenchmarkConfig,
    /// Sorted descending by the configured sort counter, absent last.
    pub rows: Vec<BenchmarkRow>,
    pub long: Vec<BenchmarkEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BenchmarkView {
    /// The measure group has no state benchmark layout.
    Unavailable,
    Available(StateBenchmark),
}

/// Every view for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub kpis: Kpis,
    pub distribution: Vec<MeasureDistribution>,
    pub performance: Vec<PerformanceCount>,
    pub volume: VolumeView,
    pub state_averages: Vec<StateAverage>,
    pub rankings: Rankings,
    pub benchmark: BenchmarkView,
}

impl DashboardViews {
    /// Filter both tables by `selection` and evaluate every view.
    pub fn compute(
        hospital: &DataFrame,
        state: &DataFrame,
        selection: &Selection,
    ) -> Result<Self, ViewError> {
        let filtered = DataProcessor::filter(hospital, selection)?;

        let views = Self {
            kpis: ViewCalculator::kpis(&filtered)?,
            distribution: ViewCalculator::score_distribution(&filtered, selection)?,
            performance: ViewCalculator::performance_counts(&filtered, selection)?,
            volume: ViewCalculator::volume(&filtered, selection.group)?,
            state_averages: ViewCalculator::state_averages(&filtered)?,
            rankings: ViewCalculator::rankings(&filtered)?,
            benchmark: ViewCalculator::state_benchmark(state, selection)?,
        };
        debug!(
            rows = views.kpis.rows,
            hospitals = views.kpis.hospitals,
            states = views.state_averages.len(),
            "computed dashboard views"
        );
        Ok(views)
    }
}

/// Computes the individual views from an already filtered table.
pub struct ViewCalculator;

impl ViewCalculator {
    /// Distinct hospitals and measures, score coverage and mean score.
    pub fn kpis(df: &DataFrame) -> Result<Kpis, ViewError> {
        let rows = df.height();
        let hospitals = str_col(df, FACILITY_ID)?
            .into_iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len();
        let measures = str_col(df, MEASURE_NAME)?
            .into_iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len();
        let scores: Vec<f64> = f64_col(df, SCORE)?.into_iter().flatten().collect();

        let coverage = if rows == 0 {
            0.0
        } else {
            scores.len() as f64 / rows as f64
        };

        Ok(Kpis {
            hospitals,
            measures,
            rows,
            scored_rows: scores.len(),
            coverage,
            average_score: StatsCalculator::mean(&scores),
        })
    }

    /// Scored rows faceted by measure with box-plot statistics.
    pub fn score_distribution(
        df: &DataFrame,
        selection: &Selection,
    ) -> Result<Vec<MeasureDistribution>, ViewError> {
        let names = str_col(df, FACILITY_NAME)?;
        let states = str_col(df, STATE)?;
        let measures = str_col(df, MEASURE_NAME)?;
        let compared = str_col(df, COMPARED_TO_NATIONAL)?;
        let scores = f64_col(df, SCORE)?;

        let mut by_measure: HashMap<&str, Vec<ScorePoint>> = HashMap::new();
        for i in 0..df.height() {
            let (Some(measure), Some(score)) = (measures.get(i), scores.get(i)) else {
                continue;
            };
            by_measure.entry(measure).or_default().push(ScorePoint {
                facility_name: names.get(i).map(str::to_string),
                state: states.get(i).map(str::to_string),
                score,
                compared_to_national: compared.get(i).map(str::to_string),
            });
        }

        let mut ordered: Vec<(&str, Vec<ScorePoint>)> = by_measure.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| {
            measure_position(selection, a)
                .cmp(&measure_position(selection, b))
                .then_with(|| a.cmp(b))
        });

        let value_sets: Vec<(String, Vec<f64>)> = ordered
            .iter()
            .map(|(m, points)| (m.to_string(), points.iter().map(|p| p.score).collect()))
            .collect();
        let mut summaries: HashMap<String, BoxSummary> =
            StatsCalculator::box_summaries_parallel(&value_sets).into_iter().collect();

        Ok(ordered
            .into_iter()
            .filter_map(|(measure, points)| {
                summaries.remove(measure).map(|summary| MeasureDistribution {
                    measure: measure.to_string(),
                    points,
                    summary,
                })
            })
            .collect())
    }

    /// Rows per (measure, "Compared to National") pair. Rows without a
    /// category are counted under "Not Available".
    pub fn performance_counts(
        df: &DataFrame,
        selection: &Selection,
    ) -> Result<Vec<PerformanceCount>, ViewError> {
        let counted = df
            .clone()
            .lazy()
            .select([
                col(MEASURE_NAME),
                col(COMPARED_TO_NATIONAL)
                    .fill_null(lit(NOT_AVAILABLE))
                    .alias(CATEGORY),
            ])
            .group_by([col(MEASURE_NAME), col(CATEGORY)])
            .agg([len().alias(HOSPITALS)])
            .collect()?;

        let measures = str_col(&counted, MEASURE_NAME)?;
        let categories = str_col(&counted, CATEGORY)?;
        let hospitals = counted.column(HOSPITALS)?.cast(&DataType::Int64)?;
        let hospitals = hospitals.i64()?;

        let mut counts: Vec<PerformanceCount> = (0..counted.height())
            .filter_map(|i| {
                Some(PerformanceCount {
                    measure: measures.get(i)?.to_string(),
                    category: categories.get(i)?.to_string(),
                    hospitals: hospitals.get(i)? as usize,
                })
            })
            .collect();

        counts.sort_by(|a, b| {
            measure_position(selection, &a.measure)
                .cmp(&measure_position(selection, &b.measure))
                .then_with(|| a.measure.cmp(&b.measure))
                .then_with(|| perf_rank(&a.category).cmp(&perf_rank(&b.category)))
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(counts)
    }

    /// Patient volume against score. Only defined for the EDAC group.
    pub fn volume(df: &DataFrame, group: MeasureGroup) -> Result<VolumeView, ViewError> {
        if !group.has_volume_data() {
            return Ok(VolumeView::NotApplicable);
        }

        let names = str_col(df, FACILITY_NAME)?;
        let states = str_col(df, STATE)?;
        let compared = str_col(df, COMPARED_TO_NATIONAL)?;
        let scores = f64_col(df, SCORE)?;
        let patients = f64_col(df, NUMBER_OF_PATIENTS)?;
        let returned = f64_col(df, NUMBER_OF_PATIENTS_RETURNED)?;

        let points: Vec<VolumePoint> = (0..df.height())
            .filter_map(|i| {
                let score = scores.get(i)?;
                let patients = patients.get(i)?;
                Some(VolumePoint {
                    facility_name: names.get(i).map(str::to_string),
                    state: states.get(i).map(str::to_string),
                    patients,
                    score,
                    bubble_size: returned.get(i).unwrap_or(patients),
                    compared_to_national: compared.get(i).map(str::to_string),
                })
            })
            .collect();

        let mut top_contributors = points.clone();
        top_contributors.sort_by(|a, b| b.patients.total_cmp(&a.patients));
        top_contributors.truncate(TOP_CONTRIBUTORS);

        Ok(VolumeView::Available {
            points,
            top_contributors,
        })
    }

    /// Mean score per state, highest average first.
    pub fn state_averages(df: &DataFrame) -> Result<Vec<StateAverage>, ViewError> {
        let grouped = df
            .clone()
            .lazy()
            .filter(col(SCORE).is_not_null().and(col(STATE).is_not_null()))
            .group_by([col(STATE)])
            .agg([col(SCORE).mean().alias(AVERAGE_SCORE), len().alias(ROWS)])
            .sort(
                [AVERAGE_SCORE, STATE],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        let states = str_col(&grouped, STATE)?;
        let averages = f64_col(&grouped, AVERAGE_SCORE)?;
        let rows = grouped.column(ROWS)?.cast(&DataType::Int64)?;
        let rows = rows.i64()?;

        Ok((0..grouped.height())
            .filter_map(|i| {
                Some(StateAverage {
                    state: states.get(i)?.to_string(),
                    average_score: averages.get(i)?,
                    rows: rows.get(i)? as usize,
                })
            })
            .collect())
    }

    /// Highest and lowest scoring rows. Lower scores are better.
    pub fn rankings(df: &DataFrame) -> Result<Rankings, ViewError> {
        let ranked = df
            .clone()
            .lazy()
            .filter(col(SCORE).is_not_null())
            .sort(
                [SCORE],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .collect()?;

        let lowest_performing = Self::ranked_rows(&ranked.head(Some(RANKING_SIZE)))?;
        let mut best_performing = Self::ranked_rows(&ranked.tail(Some(RANKING_SIZE)))?;
        best_performing.sort_by(|a, b| a.score.total_cmp(&b.score));

        Ok(Rankings {
            lowest_performing,
            best_performing,
        })
    }

    fn ranked_rows(df: &DataFrame) -> Result<Vec<RankedHospital>, ViewError> {
        let names = str_col(df, FACILITY_NAME)?;
        let states = str_col(df, STATE)?;
        let measures = str_col(df, MEASURE_NAME)?;
        let scores = f64_col(df, SCORE)?;

        Ok((0..df.height())
            .filter_map(|i| {
                Some(RankedHospital {
                    facility_name: names.get(i).map(str::to_string),
                    state: states.get(i).map(str::to_string),
                    measure: measures.get(i).map(str::to_string),
                    score: scores.get(i)?,
                })
            })
            .collect())
    }

    /// State-level hospital counts per benchmark category for the selected
    /// group, in wide and long form.
    pub fn state_benchmark(
        state_df: &DataFrame,
        selection: &Selection,
    ) -> Result<BenchmarkView, ViewError> {
        Self::state_benchmark_with(state_df, selection, benchmark_config(selection.group))
    }

    /// [`Self::state_benchmark`] with an explicit layout; `None` yields
    /// [`BenchmarkView::Unavailable`].
    pub fn state_benchmark_with(
        state_df: &DataFrame,
        selection: &Selection,
        config: Option<&'static BenchmarkConfig>,
    ) -> Result<BenchmarkView, ViewError> {
        let Some(config) = config else {
            debug!(group = %selection.group, "no state benchmark layout");
            return Ok(BenchmarkView::Unavailable);
        };

        let columns: Vec<&str> = config.counters.iter().map(|c| c.column()).collect();
        let filtered = DataProcessor::filter(state_df, selection)?;
        let kept = DataProcessor::drop_rows_all_null(&filtered, &columns)?;

        let states = str_col(&kept, STATE)?;
        let measures = str_col(&kept, MEASURE_NAME)?;
        let counter_columns = columns
            .iter()
            .map(|name| kept.column(name)?.cast(&DataType::Int64))
            .collect::<Result<Vec<Column>, PolarsError>>()?;
        let counter_cas = counter_columns
            .iter()
            .map(|c| c.i64())
            .collect::<Result<Vec<_>, PolarsError>>()?;

        let mut rows: Vec<BenchmarkRow> = (0..kept.height())
            .map(|i| BenchmarkRow {
                state: states.get(i).map(str::to_string),
                measure: measures.get(i).map(str::to_string),
                counts: config
                    .counters
                    .iter()
                    .zip(&counter_cas)
                    .map(|(counter, ca)| (*counter, ca.get(i)))
                    .collect(),
            })
            .collect();
        // Option orders None first, so a reversed comparison puts absent last.
        rows.sort_by(|a, b| b.count(config.sort_by).cmp(&a.count(config.sort_by)));

        let long_df =
            DataProcessor::stack_to_long(&kept, &[STATE, MEASURE_NAME], &columns, PERFORMANCE, HOSPITALS)?;
        let long_states = str_col(&long_df, STATE)?;
        let long_measures = str_col(&long_df, MEASURE_NAME)?;
        let performance = str_col(&long_df, PERFORMANCE)?;
        let hospitals = long_df.column(HOSPITALS)?.i64()?;

        let long = (0..long_df.height())
            .filter_map(|i| {
                Some(BenchmarkEntry {
                    state: long_states.get(i).map(str::to_string),
                    measure: long_measures.get(i).map(str::to_string),
                    performance: BenchmarkCounter::from_column(performance.get(i)?)?,
                    hospitals: hospitals.get(i),
                })
            })
            .collect();

        Ok(BenchmarkView::Available(StateBenchmark { config, rows, long }))
    }
}

fn str_col<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, ViewError> {
    Ok(df.column(name)?.str()?)
}

fn f64_col<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, ViewError> {
    Ok(df.column(name)?.f64()?)
}

/// Position of a measure in the selection; unselected measures sort last.
fn measure_position(selection: &Selection, measure: &str) -> usize {
    selection
        .measures
        .iter()
        .position(|m| m == measure)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PN: &str = "Pneumonia (PN) 30-Day Readmission Rate";
    const HF: &str = "Heart failure (HF) 30-Day Readmission Rate";

    fn hospital_frame(rows: &[(&str, &str, &str, Option<f64>, Option<&str>)]) -> DataFrame {
        let n = rows.len();
        DataFrame::new(vec![
            Column::new(FACILITY_ID.into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
            Column::new(
                FACILITY_NAME.into(),
                rows.iter().map(|r| format!("Hospital {}", r.0)).collect::<Vec<_>>(),
            ),
            Column::new(STATE.into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new(MEASURE_NAME.into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new(SCORE.into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
            Column::new(
                COMPARED_TO_NATIONAL.into(),
                rows.iter().map(|r| r.4).collect::<Vec<_>>(),
            ),
            Column::full_null(NUMBER_OF_PATIENTS.into(), n, &DataType::Float64),
            Column::full_null(NUMBER_OF_PATIENTS_RETURNED.into(), n, &DataType::Float64),
        ])
        .unwrap()
    }

    fn scenario() -> DataFrame {
        hospital_frame(&[
            ("F1", "CA", PN, Some(15.2), Some("Worse than expected")),
            ("F2", "CA", PN, None, None),
            ("F3", "TX", PN, Some(10.0), Some("Better than expected")),
        ])
    }

    fn pn_selection() -> Selection {
        Selection::new(MeasureGroup::ConditionSpecific, vec![PN.into()], vec![])
    }

    #[test]
    fn test_kpis_scenario() {
        let kpis = ViewCalculator::kpis(&scenario()).unwrap();
        assert_eq!(kpis.hospitals, 3);
        assert_eq!(kpis.measures, 1);
        assert!((kpis.coverage - 2.0 / 3.0).abs() < 1e-12);
        assert!((kpis.average_score.unwrap() - 12.6).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_bounds() {
        let none_scored = hospital_frame(&[("A", "CA", PN, None, None), ("B", "CA", PN, None, None)]);
        let kpis = ViewCalculator::kpis(&none_scored).unwrap();
        assert_eq!(kpis.coverage, 0.0);
        assert_eq!(kpis.average_score, None);

        let all_scored = hospital_frame(&[("A", "CA", PN, Some(1.0), None)]);
        assert_eq!(ViewCalculator::kpis(&all_scored).unwrap().coverage, 1.0);

        let empty = scenario().head(Some(0));
        let kpis = ViewCalculator::kpis(&empty).unwrap();
        assert_eq!(kpis.rows, 0);
        assert_eq!(kpis.coverage, 0.0);
    }

    #[test]
    fn test_performance_counts_substitute_not_available() {
        let counts = ViewCalculator::performance_counts(&scenario(), &pn_selection()).unwrap();
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.category.as_str(), c.hospitals)).collect();
        assert_eq!(
            pairs,
            vec![
                ("Better than expected", 1),
                ("Worse than expected", 1),
                (NOT_AVAILABLE, 1),
            ]
        );
        assert!(counts.iter().all(|c| c.measure == PN));
    }

    #[test]
    fn test_distribution_keeps_missing_category_absent() {
        let df = hospital_frame(&[
            ("A", "CA", PN, Some(3.0), None),
            ("B", "CA", HF, Some(2.0), Some("No Different than expected")),
            ("C", "CA", PN, Some(5.0), Some("Better than expected")),
            ("D", "CA", PN, None, Some("Better than expected")),
        ]);
        let sel = Selection::new(
            MeasureGroup::ConditionSpecific,
            vec![HF.into(), PN.into()],
            vec![],
        );
        let dist = ViewCalculator::score_distribution(&df, &sel).unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].measure, HF);
        assert_eq!(dist[1].measure, PN);
        assert_eq!(dist[1].points.len(), 2);
        assert_eq!(dist[1].summary.median, 4.0);

        let split = dist[1].by_category();
        assert_eq!(split[0].0, Some("Better than expected"));
        assert_eq!(split[1], (None, vec![3.0]));
    }

    #[test]
    fn test_state_averages_scenario() {
        let averages = ViewCalculator::state_averages(&scenario()).unwrap();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].state, "CA");
        assert!((averages[0].average_score - 15.2).abs() < 1e-12);
        assert_eq!(averages[0].rows, 1);
        assert_eq!(averages[1].state, "TX");
        assert!((averages[1].average_score - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_rankings_are_disjoint_and_ordered() {
        let ids: Vec<String> = (0..25).map(|i| format!("F{i:02}")).collect();
        let rows: Vec<(&str, &str, &str, Option<f64>, Option<&str>)> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), "CA", PN, Some(i as f64), None))
            .collect();
        let rankings = ViewCalculator::rankings(&hospital_frame(&rows)).unwrap();

        assert_eq!(rankings.lowest_performing.len(), RANKING_SIZE);
        assert_eq!(rankings.best_performing.len(), RANKING_SIZE);
        assert_eq!(rankings.lowest_performing[0].score, 24.0);
        assert_eq!(rankings.best_performing[0].score, 0.0);

        assert!(rankings
            .lowest_performing
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert!(rankings
            .best_performing
            .windows(2)
            .all(|w| w[0].score <= w[1].score));

        let worst: HashSet<_> = rankings
            .lowest_performing
            .iter()
            .map(|r| r.facility_name.clone())
            .collect();
        assert!(rankings
            .best_performing
            .iter()
            .all(|r| !worst.contains(&r.facility_name)));
    }

    #[test]
    fn test_volume_not_applicable_outside_edac() {
        for group in MeasureGroup::ALL {
            let view = ViewCalculator::volume(&scenario(), group).unwrap();
            assert_eq!(view == VolumeView::NotApplicable, group != MeasureGroup::Edac);
        }
    }

    #[test]
    fn test_volume_bubble_size_and_top_contributors() {
        let measure = MeasureGroup::Edac.measures()[0];
        let n = 20;
        let df = DataFrame::new(vec![
            Column::new(FACILITY_ID.into(), (0..n).map(|i| format!("{i}")).collect::<Vec<_>>()),
            Column::new(FACILITY_NAME.into(), (0..n).map(|i| format!("H{i}")).collect::<Vec<_>>()),
            Column::new(STATE.into(), vec!["CA"; n]),
            Column::new(MEASURE_NAME.into(), vec![measure; n]),
            Column::new(
                SCORE.into(),
                (0..n).map(|i| if i == 0 { None } else { Some(i as f64) }).collect::<Vec<_>>(),
            ),
            Column::new(
                COMPARED_TO_NATIONAL.into(),
                vec![Option::<&str>::None; n],
            ),
            Column::new(
                NUMBER_OF_PATIENTS.into(),
                (0..n).map(|i| Some(100.0 + i as f64)).collect::<Vec<_>>(),
            ),
            Column::new(
                NUMBER_OF_PATIENTS_RETURNED.into(),
                (0..n).map(|i| if i % 2 == 0 { Some(7.0) } else { None }).collect::<Vec<_>>(),
            ),
        ])
        .unwrap();

        let VolumeView::Available { points, top_contributors } =
            ViewCalculator::volume(&df, MeasureGroup::Edac).unwrap()
        else {
            panic!("EDAC volume should be available");
        };
        // Row 0 has no score.
        assert_eq!(points.len(), n - 1);
        assert_eq!(points[0].bubble_size, 101.0);
        assert_eq!(points[1].bubble_size, 7.0);

        assert_eq!(top_contributors.len(), TOP_CONTRIBUTORS);
        assert_eq!(top_contributors[0].patients, 119.0);
        assert!(top_contributors
            .windows(2)
            .all(|w| w[0].patients >= w[1].patients));
    }

    #[test]
    fn test_empty_selection_degrades_everywhere() {
        let hospital = scenario();
        let state = benchmark_frame();
        let sel = Selection::new(MeasureGroup::Edac, vec![], vec![]);

        let views = DashboardViews::compute(&hospital, &state, &sel).unwrap();
        assert_eq!(views.kpis.rows, 0);
        assert_eq!(views.kpis.average_score, None);
        assert!(views.distribution.is_empty());
        assert!(views.performance.is_empty());
        assert!(views.state_averages.is_empty());
        assert!(views.rankings.lowest_performing.is_empty());
        assert!(views.rankings.best_performing.is_empty());
        match views.volume {
            VolumeView::Available { points, top_contributors } => {
                assert!(points.is_empty());
                assert!(top_contributors.is_empty());
            }
            VolumeView::NotApplicable => panic!("EDAC volume should be available"),
        }
    }

    fn benchmark_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(STATE.into(), vec!["CA", "TX", "NY", "WA"]),
            Column::new(MEASURE_NAME.into(), vec![PN, PN, PN, HF]),
            Column::new(
                "Number of Hospitals Better".into(),
                vec![Some(2i64), None, Some(1), Some(4)],
            ),
            Column::new(
                "Number of Hospitals Same".into(),
                vec![Some(30i64), None, Some(20), Some(9)],
            ),
            Column::new(
                "Number of Hospitals Worse".into(),
                vec![Some(3i64), None, None, Some(1)],
            ),
            Column::new(
                "Number of Hospitals Too Small".into(),
                vec![Some(5i64), None, Some(2), Some(0)],
            ),
            Column::new(
                "Number of Hospitals Fewer".into(),
                vec![Some(99i64), Some(99), Some(99), Some(99)],
            ),
            Column::full_null("Number of Hospitals Too Few".into(), 4, &DataType::Int64),
            Column::full_null("Number of Hospitals Average".into(), 4, &DataType::Int64),
            Column::full_null("Number of Hospitals More".into(), 4, &DataType::Int64),
        ])
        .unwrap()
    }

    #[test]
    fn test_state_benchmark_drops_all_absent_rows() {
        let view = ViewCalculator::state_benchmark(&benchmark_frame(), &pn_selection()).unwrap();
        let BenchmarkView::Available(bench) = view else {
            panic!("condition-specific benchmark should be available");
        };

        // TX has every relevant counter absent; Fewer is not relevant here.
        let states: Vec<_> = bench.rows.iter().map(|r| r.state.as_deref()).collect();
        assert_eq!(states, vec![Some("CA"), Some("NY")]);
        assert!(bench.long.iter().all(|e| e.state.as_deref() != Some("TX")));
        assert_eq!(bench.long.len(), 2 * 4);
        assert_eq!(bench.long[0].performance, BenchmarkCounter::Better);
        assert_eq!(bench.long[2].performance, BenchmarkCounter::Same);
    }

    #[test]
    fn test_state_benchmark_long_form_preserves_totals() {
        let sel = Selection::new(
            MeasureGroup::ConditionSpecific,
            vec![PN.into(), HF.into()],
            vec![],
        );
        let BenchmarkView::Available(bench) =
            ViewCalculator::state_benchmark(&benchmark_frame(), &sel).unwrap()
        else {
            panic!("benchmark should be available");
        };

        for row in &bench.rows {
            let long_total: i64 = bench
                .long
                .iter()
                .filter(|e| e.state == row.state && e.measure == row.measure)
                .filter_map(|e| e.hospitals)
                .sum();
            assert_eq!(long_total, row.total());
        }
    }

    #[test]
    fn test_state_benchmark_sorted_by_named_column() {
        let sel = Selection::new(
            MeasureGroup::ConditionSpecific,
            vec![PN.into(), HF.into()],
            vec![],
        );
        let BenchmarkView::Available(bench) =
            ViewCalculator::state_benchmark(&benchmark_frame(), &sel).unwrap()
        else {
            panic!("benchmark should be available");
        };
        assert_eq!(bench.config.sort_by, BenchmarkCounter::Worse);
        let worse: Vec<Option<i64>> = bench.rows.iter().map(|r| r.count(BenchmarkCounter::Worse)).collect();
        assert_eq!(worse, vec![Some(3), Some(1), None]);
    }

    #[test]
    fn test_state_benchmark_unavailable_without_config() {
        let view =
            ViewCalculator::state_benchmark_with(&benchmark_frame(), &pn_selection(), None).unwrap();
        assert_eq!(view, BenchmarkView::Unavailable);
    }
}
