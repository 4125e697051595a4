//! End-to-end checks: CSV files through the loader, filter and views.

use std::io::Write;
use tempfile::NamedTempFile;
use uhv_dashboard::data::schema::{COMPARED_TO_NATIONAL, SCORE};
use uhv_dashboard::report::{DashboardReport, ReportSources};
use uhv_dashboard::stats::{BenchmarkView, VolumeView};
use uhv_dashboard::taxonomy::{BenchmarkCounter, MeasureGroup, NOT_AVAILABLE};
use uhv_dashboard::{DashboardViews, DataLoader, Selection};

const PN: &str = "Pneumonia (PN) 30-Day Readmission Rate";
const HF_DAYS: &str = "Hospital return days for heart failure patients";

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn hospital_csv() -> NamedTempFile {
    write_csv(&format!(
        "Facility ID,Facility Name,State,Measure Name,Compared to National,Denominator,Score,Number of Patients,Number of Patients Returned\n\
         F1,Alpha General,CA,{PN},Worse than expected,400,15.2,Not Applicable,Not Applicable\n\
         F2,Beta Medical,CA,{PN},Not Available,Not Available,Not Available,Not Applicable,Not Applicable\n\
         F3,Gamma Regional,TX,{PN},Better than expected,250,10.0,Not Applicable,Not Applicable\n\
         F1,Alpha General,CA,{HF_DAYS},More Days Than Average per 100 Discharges,300,25.5,300,40\n\
         F3,Gamma Regional,TX,{HF_DAYS},Fewer Days Than Average per 100 Discharges,150,-12.0,150,Too Few to Report\n"
    ))
}

fn state_csv() -> NamedTempFile {
    write_csv(&format!(
        "State,Measure Name,Number of Hospitals Worse,Number of Hospitals Same,Number of Hospitals Better,Number of Hospitals Too Few,Number of Hospitals Fewer,Number of Hospitals Average,Number of Hospitals More,Number of Hospitals Too Small\n\
         CA,{PN},12,200,8,30,Not Applicable,Not Applicable,Not Applicable,Not Applicable\n\
         TX,{PN},20,150,5,25,Not Applicable,Not Applicable,Not Applicable,Not Applicable\n\
         NV,{PN},Not Available,Not Available,Not Available,Not Available,Not Applicable,Not Applicable,Not Applicable,Not Available\n\
         CA,{HF_DAYS},Not Applicable,Not Applicable,Not Applicable,Not Applicable,40,120,35,10\n"
    ))
}

fn load() -> (polars::prelude::DataFrame, polars::prelude::DataFrame) {
    let hospital = DataLoader::read_hospital_csv(hospital_csv().path()).unwrap();
    let state = DataLoader::read_state_csv(state_csv().path()).unwrap();
    (hospital, state)
}

#[test]
fn test_condition_specific_scenario() {
    let (hospital, state) = load();
    let selection = Selection::new(
        MeasureGroup::ConditionSpecific,
        vec![PN.to_string()],
        Vec::new(),
    );
    let views = DashboardViews::compute(&hospital, &state, &selection).unwrap();

    assert_eq!(views.kpis.rows, 3);
    assert_eq!(views.kpis.hospitals, 3);
    assert!((views.kpis.coverage - 2.0 / 3.0).abs() < 1e-12);

    let averages: Vec<(&str, f64)> = views
        .state_averages
        .iter()
        .map(|a| (a.state.as_str(), a.average_score))
        .collect();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0].0, "CA");
    assert!((averages[0].1 - 15.2).abs() < 1e-9);
    assert_eq!(averages[1].0, "TX");
    assert!((averages[1].1 - 10.0).abs() < 1e-9);

    let mut counts: Vec<(&str, usize)> = views
        .performance
        .iter()
        .map(|c| (c.category.as_str(), c.hospitals))
        .collect();
    counts.sort();
    assert_eq!(
        counts,
        vec![
            ("Better than expected", 1),
            (NOT_AVAILABLE, 1),
            ("Worse than expected", 1),
        ]
    );

    assert_eq!(views.volume, VolumeView::NotApplicable);
}

#[test]
fn test_sentinels_never_survive_loading() {
    let (hospital, _) = load();
    let compared = hospital.column(COMPARED_TO_NATIONAL).unwrap().str().unwrap();
    assert!(compared
        .into_iter()
        .flatten()
        .all(|v| !uhv_dashboard::data::schema::is_missing_sentinel(v)));
    assert_eq!(hospital.column(SCORE).unwrap().null_count(), 1);
}

#[test]
fn test_edac_volume_and_benchmark() {
    let (hospital, state) = load();
    let selection = Selection::for_group(MeasureGroup::Edac);
    assert_eq!(
        selection.measures,
        vec!["Hospital return days for heart attack patients"]
    );
    let selection = Selection::new(MeasureGroup::Edac, vec![HF_DAYS.to_string()], Vec::new());
    let views = DashboardViews::compute(&hospital, &state, &selection).unwrap();

    match &views.volume {
        VolumeView::Available {
            points,
            top_contributors,
        } => {
            assert_eq!(points.len(), 2);
            assert_eq!(top_contributors[0].patients, 300.0);
            assert_eq!(top_contributors[0].bubble_size, 40.0);
            // Returned patients missing: falls back to the patient count.
            assert_eq!(top_contributors[1].bubble_size, 150.0);
        }
        VolumeView::NotApplicable => panic!("EDAC must have a volume view"),
    }

    let BenchmarkView::Available(bench) = &views.benchmark else {
        panic!("EDAC has a benchmark layout");
    };
    assert_eq!(bench.rows.len(), 1);
    assert_eq!(bench.rows[0].count(BenchmarkCounter::More), Some(35));
    assert_eq!(bench.rows[0].total(), 205);
    assert_eq!(bench.long.len(), 4);
}

#[test]
fn test_all_absent_benchmark_row_is_dropped() {
    let (hospital, state) = load();
    let selection = Selection::new(
        MeasureGroup::ConditionSpecific,
        vec![PN.to_string()],
        Vec::new(),
    );
    let views = DashboardViews::compute(&hospital, &state, &selection).unwrap();

    let BenchmarkView::Available(bench) = &views.benchmark else {
        panic!("condition-specific group has a benchmark layout");
    };
    let states: Vec<&str> = bench
        .rows
        .iter()
        .filter_map(|r| r.state.as_deref())
        .collect();
    // Sorted descending by "Worse"; NV has no counters at all.
    assert_eq!(states, vec!["TX", "CA"]);
    assert!(bench.long.iter().all(|e| e.state.as_deref() != Some("NV")));
}

#[test]
fn test_state_filter_and_empty_selection() {
    let (hospital, state) = load();

    let selection = Selection::new(
        MeasureGroup::ConditionSpecific,
        vec![PN.to_string()],
        vec!["TX".to_string()],
    );
    let views = DashboardViews::compute(&hospital, &state, &selection).unwrap();
    assert_eq!(views.kpis.rows, 1);
    assert_eq!(views.rankings.best_performing.len(), 1);

    let nothing = Selection::new(MeasureGroup::ConditionSpecific, Vec::new(), Vec::new());
    let views = DashboardViews::compute(&hospital, &state, &nothing).unwrap();
    assert_eq!(views.kpis.rows, 0);
    assert_eq!(views.kpis.coverage, 0.0);
    assert_eq!(views.kpis.average_score, None);
    assert!(views.distribution.is_empty());
    assert!(views.performance.is_empty());
    assert!(views.state_averages.is_empty());
    assert!(views.rankings.lowest_performing.is_empty());
}

#[test]
fn test_report_json() {
    let (hospital, state) = load();
    let selection = Selection::new(
        MeasureGroup::ConditionSpecific,
        vec![PN.to_string()],
        Vec::new(),
    );
    let views = DashboardViews::compute(&hospital, &state, &selection).unwrap();
    let sources = ReportSources {
        hospital_csv: "hospital.csv".into(),
        state_csv: "state.csv".into(),
    };

    let mut buf = Vec::new();
    DashboardReport::new(sources, &selection, &views)
        .write_json(&mut buf)
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert_eq!(json["views"]["kpis"]["rows"], 3);
    assert_eq!(json["views"]["volume"]["status"], "not_applicable");
    assert_eq!(json["selection"]["measures"][0], PN);
}

#[test]
fn test_cached_load_returns_same_table() {
    let file = hospital_csv();
    let first = DataLoader::load_hospital_table(file.path()).unwrap();
    let second = DataLoader::load_hospital_table(file.path()).unwrap();
    assert!(first.equals_missing(&second));
}
