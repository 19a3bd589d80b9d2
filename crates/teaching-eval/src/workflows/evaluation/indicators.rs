use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed evaluation indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKey {
    TeachingProcessManagement,
    CourseConstruction,
    TeachingReformProjects,
    HonoraryAwards,
    TeachingQuality,
    StudentGuidance,
    ScientificResearch,
    TeamBuilding,
}

impl IndicatorKey {
    pub const fn key(self) -> &'static str {
        match self {
            Self::TeachingProcessManagement => "teaching_process_management",
            Self::CourseConstruction => "course_construction",
            Self::TeachingReformProjects => "teaching_reform_projects",
            Self::HonoraryAwards => "honorary_awards",
            Self::TeachingQuality => "teaching_quality",
            Self::StudentGuidance => "student_guidance",
            Self::ScientificResearch => "scientific_research",
            Self::TeamBuilding => "team_building",
        }
    }

    /// Indicators whose declared count is checked against parsed attachments.
    pub const fn is_count_sensitive(self) -> bool {
        matches!(self, Self::TeachingReformProjects | Self::HonoraryAwards)
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Catalogue entry with the maximum points an indicator contributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indicator {
    pub key: IndicatorKey,
    pub label: &'static str,
    pub max_score: f64,
}

const STANDARD_INDICATORS: [Indicator; 8] = [
    Indicator {
        key: IndicatorKey::TeachingProcessManagement,
        label: "Teaching process management",
        max_score: 15.0,
    },
    Indicator {
        key: IndicatorKey::CourseConstruction,
        label: "Course construction",
        max_score: 15.0,
    },
    Indicator {
        key: IndicatorKey::TeachingReformProjects,
        label: "Teaching reform projects",
        max_score: 20.0,
    },
    Indicator {
        key: IndicatorKey::HonoraryAwards,
        label: "Honorary awards",
        max_score: 15.0,
    },
    Indicator {
        key: IndicatorKey::TeachingQuality,
        label: "Teaching quality",
        max_score: 15.0,
    },
    Indicator {
        key: IndicatorKey::StudentGuidance,
        label: "Student guidance",
        max_score: 10.0,
    },
    Indicator {
        key: IndicatorKey::ScientificResearch,
        label: "Scientific research",
        max_score: 5.0,
    },
    Indicator {
        key: IndicatorKey::TeamBuilding,
        label: "Team building",
        max_score: 5.0,
    },
];

/// Indicator catalogue bounding every score set.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorCatalogue {
    indicators: &'static [Indicator],
}

impl IndicatorCatalogue {
    pub const fn standard() -> Self {
        Self {
            indicators: &STANDARD_INDICATORS,
        }
    }

    pub fn indicators(&self) -> &'static [Indicator] {
        self.indicators
    }

    pub fn get(&self, key: IndicatorKey) -> Option<&'static Indicator> {
        self.indicators
            .iter()
            .find(|indicator| indicator.key == key)
    }

    pub fn count_sensitive(&self) -> impl Iterator<Item = &'static Indicator> {
        self.indicators
            .iter()
            .filter(|indicator| indicator.key.is_count_sensitive())
    }

    /// Upper bound for the per-indicator sum of any score set.
    pub fn total_max(&self) -> f64 {
        self.indicators
            .iter()
            .map(|indicator| indicator.max_score)
            .sum()
    }
}

impl Default for IndicatorCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}
