//! Measure Taxonomy Module
//! Static CMS measure groups, category orderings and benchmark layouts.

use serde::Serialize;

/// Label substituted for a missing "Compared to National" category.
pub const NOT_AVAILABLE: &str = "Not Available";

/// A cluster of methodologically comparable CMS measures.
///
/// Scores are only ever compared within one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeasureGroup {
    Edac,
    HospitalWideReadmission,
    ProcedureOutpatient,
    ConditionSpecific,
}

impl Default for MeasureGroup {
    fn default() -> Self {
        MeasureGroup::Edac
    }
}

impl MeasureGroup {
    /// All groups in selector order.
    pub const ALL: [MeasureGroup; 4] = [
        MeasureGroup::Edac,
        MeasureGroup::HospitalWideReadmission,
        MeasureGroup::ProcedureOutpatient,
        MeasureGroup::ConditionSpecific,
    ];

    /// Display name, as shown in the group selector.
    pub fn name(self) -> &'static str {
        match self {
            MeasureGroup::Edac => "EDAC – Excess Hospital Return Days",
            MeasureGroup::HospitalWideReadmission => "Hospital-Wide Readmission Ratio",
            MeasureGroup::ProcedureOutpatient => "Procedure / Outpatient Visit Rates",
            MeasureGroup::ConditionSpecific => "Condition-Specific 30-Day Readmission Rates",
        }
    }

    /// Measure names belonging to this group, in display order.
    pub fn measures(self) -> &'static [&'static str] {
        match self {
            MeasureGroup::Edac => &[
                "Hospital return days for heart attack patients",
                "Hospital return days for heart failure patients",
                "Hospital return days for pneumonia patients",
            ],
            MeasureGroup::HospitalWideReadmission => {
                &["Hybrid Hospital-Wide All-Cause Readmission Measure (HWR)"]
            }
            MeasureGroup::ProcedureOutpatient => &[
                "Rate of unplanned hospital visits after colonoscopy (per 1,000 colonoscopies)",
                "Rate of inpatient admissions for patients receiving outpatient chemotherapy",
                "Rate of emergency department (ED) visits for patients receiving outpatient chemotherapy",
                "Ratio of unplanned hospital visits after hospital outpatient surgery",
            ],
            MeasureGroup::ConditionSpecific => &[
                "Acute Myocardial Infarction (AMI) 30-Day Readmission Rate",
                "Heart failure (HF) 30-Day Readmission Rate",
                "Pneumonia (PN) 30-Day Readmission Rate",
                "Rate of readmission for CABG",
                "Rate of readmission for chronic obstructive pulmonary disease (COPD) patients",
                "Rate of readmission after hip/knee replacement",
            ],
        }
    }

    /// Look a group up by its display name. Also accepts a plain hyphen in
    /// place of the en dash so the EDAC name can be typed on a command line.
    pub fn from_name(name: &str) -> Option<MeasureGroup> {
        let wanted = name.trim().replace('–', "-");
        Self::ALL
            .into_iter()
            .find(|group| group.name().replace('–', "-") == wanted)
    }

    /// Whether the patient volume view applies to this group.
    pub fn has_volume_data(self) -> bool {
        self == MeasureGroup::Edac
    }
}

impl std::fmt::Display for MeasureGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stacking and legend order for "Compared to National" labels.
pub const PERF_ORDER: [&str; 10] = [
    "Better Than the National Rate",
    "Better than expected",
    "Fewer Days Than Average per 100 Discharges",
    "No Different Than the National Rate",
    "No Different than expected",
    "Average Days per 100 Discharges",
    "Worse Than the National Rate",
    "Worse than expected",
    "More Days Than Average per 100 Discharges",
    NOT_AVAILABLE,
];

/// Position of a category label in [`PERF_ORDER`]. Unknown labels sort last.
pub fn perf_rank(label: &str) -> usize {
    PERF_ORDER
        .iter()
        .position(|known| *known == label)
        .unwrap_or(PERF_ORDER.len())
}

/// RGBA color with a straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Coarse reading of a performance label, used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTone {
    Better,
    Neutral,
    Worse,
    Insufficient,
}

impl PerformanceTone {
    /// Classify a "Compared to National" label. Anything unrecognised is
    /// treated as insufficient data.
    pub fn of(label: &str) -> PerformanceTone {
        match label {
            "Better Than the National Rate"
            | "Better than expected"
            | "Fewer Days Than Average per 100 Discharges" => PerformanceTone::Better,
            "No Different Than the National Rate"
            | "No Different than expected"
            | "Average Days per 100 Discharges" => PerformanceTone::Neutral,
            "Worse Than the National Rate"
            | "Worse than expected"
            | "More Days Than Average per 100 Discharges" => PerformanceTone::Worse,
            _ => PerformanceTone::Insufficient,
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            PerformanceTone::Better => Rgba::new(102, 187, 106, 0.75),
            PerformanceTone::Neutral => Rgba::new(100, 181, 246, 0.75),
            PerformanceTone::Worse => Rgba::new(239, 83, 80, 0.75),
            PerformanceTone::Insufficient => Rgba::new(189, 189, 189, 0.6),
        }
    }
}

/// One of the eight "Number of Hospitals ..." counters of the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BenchmarkCounter {
    Worse,
    Same,
    Better,
    TooFew,
    Fewer,
    Average,
    More,
    TooSmall,
}

impl BenchmarkCounter {
    pub const ALL: [BenchmarkCounter; 8] = [
        BenchmarkCounter::Worse,
        BenchmarkCounter::Same,
        BenchmarkCounter::Better,
        BenchmarkCounter::TooFew,
        BenchmarkCounter::Fewer,
        BenchmarkCounter::Average,
        BenchmarkCounter::More,
        BenchmarkCounter::TooSmall,
    ];

    /// CSV column holding this counter.
    pub fn column(self) -> &'static str {
        match self {
            BenchmarkCounter::Worse => "Number of Hospitals Worse",
            BenchmarkCounter::Same => "Number of Hospitals Same",
            BenchmarkCounter::Better => "Number of Hospitals Better",
            BenchmarkCounter::TooFew => "Number of Hospitals Too Few",
            BenchmarkCounter::Fewer => "Number of Hospitals Fewer",
            BenchmarkCounter::Average => "Number of Hospitals Average",
            BenchmarkCounter::More => "Number of Hospitals More",
            BenchmarkCounter::TooSmall => "Number of Hospitals Too Small",
        }
    }

    pub fn from_column(column: &str) -> Option<BenchmarkCounter> {
        Self::ALL.into_iter().find(|c| c.column() == column)
    }

    /// Legend label, the column name without its "Number of Hospitals" prefix.
    pub fn label(self) -> &'static str {
        self.column().trim_start_matches("Number of Hospitals ")
    }

    pub fn tone(self) -> PerformanceTone {
        match self {
            BenchmarkCounter::Better | BenchmarkCounter::Fewer => PerformanceTone::Better,
            BenchmarkCounter::Same | BenchmarkCounter::Average => PerformanceTone::Neutral,
            BenchmarkCounter::Worse | BenchmarkCounter::More => PerformanceTone::Worse,
            BenchmarkCounter::TooFew | BenchmarkCounter::TooSmall => {
                PerformanceTone::Insufficient
            }
        }
    }

    /// Legend position for stacked state charts.
    pub fn legend_rank(self) -> usize {
        PERF_ORDER_STATE
            .iter()
            .position(|c| *c == self)
            .unwrap_or(PERF_ORDER_STATE.len())
    }
}

/// Legend order of state benchmark counters.
pub const PERF_ORDER_STATE: [BenchmarkCounter; 7] = [
    BenchmarkCounter::Fewer,
    BenchmarkCounter::Better,
    BenchmarkCounter::Average,
    BenchmarkCounter::Same,
    BenchmarkCounter::More,
    BenchmarkCounter::Worse,
    BenchmarkCounter::TooSmall,
];

/// Which state counters describe a measure group, and how to show them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkConfig {
    pub group: MeasureGroup,
    pub counters: &'static [BenchmarkCounter],
    /// Summary table is sorted descending on this counter.
    pub sort_by: BenchmarkCounter,
}

impl BenchmarkConfig {
    /// Color assigned to each configured counter, in counter order.
    pub fn colors(&self) -> Vec<(BenchmarkCounter, Rgba)> {
        self.counters
            .iter()
            .map(|c| (*c, c.tone().color()))
            .collect()
    }
}

const EDAC_COUNTERS: [BenchmarkCounter; 4] = [
    BenchmarkCounter::Fewer,
    BenchmarkCounter::Average,
    BenchmarkCounter::More,
    BenchmarkCounter::TooSmall,
];

const NATIONAL_RATE_COUNTERS: [BenchmarkCounter; 4] = [
    BenchmarkCounter::Better,
    BenchmarkCounter::Same,
    BenchmarkCounter::Worse,
    BenchmarkCounter::TooSmall,
];

pub static BENCHMARK_CONFIGS: [BenchmarkConfig; 4] = [
    BenchmarkConfig {
        group: MeasureGroup::Edac,
        counters: &EDAC_COUNTERS,
        sort_by: BenchmarkCounter::More,
    },
    BenchmarkConfig {
        group: MeasureGroup::HospitalWideReadmission,
        counters: &NATIONAL_RATE_COUNTERS,
        sort_by: BenchmarkCounter::Worse,
    },
    BenchmarkConfig {
        group: MeasureGroup::ProcedureOutpatient,
        counters: &NATIONAL_RATE_COUNTERS,
        sort_by: BenchmarkCounter::Worse,
    },
    BenchmarkConfig {
        group: MeasureGroup::ConditionSpecific,
        counters: &NATIONAL_RATE_COUNTERS,
        sort_by: BenchmarkCounter::Worse,
    },
];

/// Benchmark layout for a group, if one is defined.
pub fn benchmark_config(group: MeasureGroup) -> Option<&'static BenchmarkConfig> {
    BENCHMARK_CONFIGS.iter().find(|cfg| cfg.group == group)
}
