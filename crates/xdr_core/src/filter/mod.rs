//! Per-view filter selections and the store predicate each one maps to.
//!
//! Every filter is a single-field equality (or nothing). Selections do not compose: the
//! alerts `Critical` filter does not also restrict status, and `All` means unfiltered.

use std::fmt::Debug;

use crate::domain::{AlertStatus, IncidentStatus, RuleStatus, Severity};
use crate::error::AppError;
use crate::store::{Collection, EqFilter, ListQuery};

pub trait ViewFilter: Copy + Debug + Default + PartialEq + 'static {
    const COLLECTION: Collection;
    const CHOICES: &'static [Self];

    fn label(&self) -> &'static str;

    fn predicate(&self) -> Option<EqFilter>;

    fn parse(label: &str) -> Result<Self, AppError> {
        Self::CHOICES
            .iter()
            .copied()
            .find(|f| f.label() == label)
            .ok_or_else(|| {
                AppError::new("FILTER_UNKNOWN", "Unknown filter selection")
                    .with_details(format!("label={label}"))
            })
    }

    /// Newest-first list of the filter's collection.
    fn query(&self) -> ListQuery {
        ListQuery::new(Self::COLLECTION).with_filter(self.predicate())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertFilter {
    #[default]
    All,
    New,
    Critical,
}

impl ViewFilter for AlertFilter {
    const COLLECTION: Collection = Collection::Alerts;
    const CHOICES: &'static [Self] = &[AlertFilter::All, AlertFilter::New, AlertFilter::Critical];

    fn label(&self) -> &'static str {
        match self {
            AlertFilter::All => "all",
            AlertFilter::New => "new",
            AlertFilter::Critical => "critical",
        }
    }

    fn predicate(&self) -> Option<EqFilter> {
        match self {
            AlertFilter::All => None,
            AlertFilter::New => Some(EqFilter::new("status", AlertStatus::New.as_str())),
            AlertFilter::Critical => Some(EqFilter::new("severity", Severity::Critical.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IncidentFilter {
    #[default]
    All,
    Open,
    Investigating,
}

impl ViewFilter for IncidentFilter {
    const COLLECTION: Collection = Collection::Incidents;
    const CHOICES: &'static [Self] = &[
        IncidentFilter::All,
        IncidentFilter::Open,
        IncidentFilter::Investigating,
    ];

    fn label(&self) -> &'static str {
        match self {
            IncidentFilter::All => "all",
            IncidentFilter::Open => "open",
            IncidentFilter::Investigating => "investigating",
        }
    }

    fn predicate(&self) -> Option<EqFilter> {
        let status = match self {
            IncidentFilter::All => return None,
            IncidentFilter::Open => IncidentStatus::Open,
            IncidentFilter::Investigating => IncidentStatus::Investigating,
        };
        Some(EqFilter::new("status", status.as_str()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleFilter {
    #[default]
    All,
    Active,
    Disabled,
}

impl ViewFilter for RuleFilter {
    const COLLECTION: Collection = Collection::DetectionRules;
    const CHOICES: &'static [Self] = &[RuleFilter::All, RuleFilter::Active, RuleFilter::Disabled];

    fn label(&self) -> &'static str {
        match self {
            RuleFilter::All => "all",
            RuleFilter::Active => "active",
            RuleFilter::Disabled => "disabled",
        }
    }

    fn predicate(&self) -> Option<EqFilter> {
        let status = match self {
            RuleFilter::All => return None,
            RuleFilter::Active => RuleStatus::Active,
            RuleFilter::Disabled => RuleStatus::Disabled,
        };
        Some(EqFilter::new("status", status.as_str()))
    }
}
