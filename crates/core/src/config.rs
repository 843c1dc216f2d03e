//! Report configuration: every table the pipeline consults, as one
//! immutable value.
//!
//! [`ReportConfig::default`] reproduces the project-approval report. A JSON
//! file may override any top-level key; keys it leaves out keep their
//! defaults, except that default category layouts for categories missing
//! from a replaced taxonomy are dropped.

use crate::error::{Error, Result};
use crate::layout::{LayoutDescriptor, LayoutRef, TitleLayout};
use crate::names::MissPolicy;
use crate::schema::ColumnMapping;
use crate::taxonomy::{StatusCategory, StatusTaxonomy};
use crate::types::{fields, SlotId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Layout keys used by the default configuration.
pub const OVERVIEW_LAYOUT: &str = "overview";
pub const DETAIL_LAYOUT: &str = "detail";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Raw export header → canonical field.
    pub columns: ColumnMapping,

    /// Fields whose values are usernames to resolve to display names.
    pub name_fields: Vec<String>,

    pub name_miss_policy: MissPolicy,

    pub taxonomy: StatusTaxonomy,

    /// Named layout descriptors.
    pub layouts: BTreeMap<String, LayoutDescriptor>,

    /// Layouts rendered per record, in order, for categories without an
    /// entry in `category_layouts`.
    pub default_layouts: Vec<String>,

    /// Per-category override of `default_layouts`.
    pub category_layouts: BTreeMap<String, Vec<String>>,

    /// Layout for the cover and section title slides.
    pub title_layout: TitleLayout,

    /// Layout for spacer slides in double-sided mode.
    pub blank_layout: LayoutRef,

    /// Title of the cover slide. `None` disables the cover slide.
    pub cover_title: Option<String>,

    pub title_field: String,
    pub status_field: String,
    pub partition_field: String,

    /// Records within one status are ordered by this field.
    pub sort_field: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let columns = [
            ("Issue key", fields::KEY),
            ("Issue id", "ID"),
            ("Created", "Created"),
            ("Summary", fields::TITLE),
            ("Custom field (Sponsor Department)", fields::SPONSOR_DEPARTMENT),
            ("Custom field (Project Classification)", "Classification"),
            ("Description", fields::DESCRIPTION),
            ("Status", fields::STATUS),
            ("Custom field (Return Type)", "Return Type"),
            ("Custom field (Return on Investment)", "ROI"),
            ("Custom field (Break Even Period)", "Break Even Period"),
            ("Custom field (Return)", "Return"),
            ("Custom field (Duration)", "Duration"),
            ("Custom field (Total Investment)", "Total Investment"),
            ("Custom field (Labor T-Shirt Size)", "Labor T-Shirt Size"),
            ("Custom field (Labor Investment)", "Labor Investment"),
            ("Custom field (Non-Labor Investment)", "Non-Labor Investment"),
            ("Custom field (Executive Sponsor)", fields::SPONSOR),
            ("Custom field (Sponsor)", fields::PROJECT_MANAGER),
            ("Custom field (Business Area Impacts)", "Business Area Impacts"),
            ("Custom field (Labor Investment Description)", "Investment Description"),
            ("Custom field (Line of Business)", "Line of Business"),
            ("Custom field (Return Description)", "Return Description"),
            ("Custom field (Scope)", "Scope"),
            ("Custom field (Scope Exclusions)", "Scope Exclusions"),
            ("Custom field (Systems)", "Systems"),
            ("Custom field (States)", "States"),
        ];

        let taxonomy = vec![
            StatusCategory::new("Project Requests", ["New Request", "Submitted", "Under Review"]),
            StatusCategory::new("Approved Projects", ["Approved", "Scheduled", "In Progress"]),
            StatusCategory::new("Deferred Projects", ["On Hold", "Deferred"]),
            StatusCategory::new("Completed Projects", ["Completed", "Closed"]),
        ];

        let overview = LayoutDescriptor::new(LayoutRef::Index(2))
            .with_title(SlotId::TITLE)
            .map(fields::KEY, 27)
            .map(fields::SPONSOR_DEPARTMENT, 23)
            .map(fields::DESCRIPTION, 1)
            .map(fields::STATUS, 24)
            .map("Return Type", 25)
            .map("ROI", 15)
            .map("Return", 16)
            .map("Total Investment", 17)
            .map(fields::SPONSOR, 19)
            .map(fields::PROJECT_MANAGER, 18)
            .map("Line of Business", 21)
            .map("States", 22);

        let detail = LayoutDescriptor::new(LayoutRef::Index(3))
            .with_title(SlotId::TITLE)
            .map("Return Description", 1)
            .map("Scope", 14)
            .map("Scope Exclusions", 15)
            .map("Systems", 17)
            .map("Business Area Impacts", 16)
            .map("Investment Description", 13);

        Self {
            columns: ColumnMapping::new(columns).unwrap_or_default(),
            name_fields: vec![fields::SPONSOR.to_string(), fields::PROJECT_MANAGER.to_string()],
            name_miss_policy: MissPolicy::Blank,
            taxonomy: StatusTaxonomy::new(taxonomy).unwrap_or_default(),
            layouts: BTreeMap::from([
                (OVERVIEW_LAYOUT.to_string(), overview),
                (DETAIL_LAYOUT.to_string(), detail),
            ]),
            default_layouts: vec![OVERVIEW_LAYOUT.to_string(), DETAIL_LAYOUT.to_string()],
            category_layouts: BTreeMap::from([(
                "Deferred Projects".to_string(),
                vec![OVERVIEW_LAYOUT.to_string()],
            )]),
            title_layout: TitleLayout {
                layout: LayoutRef::Index(0),
                title_slot: SlotId::TITLE,
                subtitle_slot: Some(SlotId(1)),
            },
            blank_layout: LayoutRef::Index(7),
            cover_title: Some("Project Approvals".to_string()),
            title_field: fields::TITLE.to_string(),
            status_field: fields::STATUS.to_string(),
            partition_field: fields::SPONSOR_DEPARTMENT.to_string(),
            sort_field: fields::TITLE.to_string(),
        }
    }
}

impl ReportConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// A file that replaces the taxonomy without giving `category_layouts`
    /// keeps only the default category layouts whose category still exists.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let own_taxonomy = value.get("taxonomy").is_some();
        let own_category_layouts = value.get("category_layouts").is_some();

        let mut config: Self = serde_json::from_value(value)?;
        if own_taxonomy && !own_category_layouts {
            let taxonomy = &config.taxonomy;
            config
                .category_layouts
                .retain(|category, _| taxonomy.position(category).is_some());
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants that deserialization cannot express.
    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;
        self.taxonomy.validate()?;

        for layout in self.layouts.values() {
            layout.validate()?;
        }

        for key in self.default_layouts.iter().chain(self.category_layouts.values().flatten()) {
            if !self.layouts.contains_key(key) {
                return Err(Error::ConfigError(format!("unknown layout '{}'", key)));
            }
        }

        for category in self.category_layouts.keys() {
            if self.taxonomy.position(category).is_none() {
                return Err(Error::ConfigError(format!(
                    "layouts given for unknown category '{}'",
                    category
                )));
            }
        }

        Ok(())
    }

    /// Layouts rendered for each record of a category, in order.
    pub fn layouts_for(&self, category: &str) -> Vec<&LayoutDescriptor> {
        self.category_layouts
            .get(category)
            .unwrap_or(&self.default_layouts)
            .iter()
            .filter_map(|key| self.layouts.get(key))
            .collect()
    }

    /// Every layout the report may instantiate.
    pub fn required_layouts(&self, double_sided: bool) -> Vec<&LayoutRef> {
        let mut refs: Vec<&LayoutRef> = vec![&self.title_layout.layout];
        if double_sided {
            refs.push(&self.blank_layout);
        }
        refs.extend(self.layouts.values().map(|l| &l.layout));
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Slot;

    #[test]
    fn test_default_is_valid() {
        let config = ReportConfig::default();
        config.validate().unwrap();

        assert_eq!(config.columns.canonical("Summary"), Some("Title"));
        assert_eq!(
            config.columns.canonical("Custom field (Sponsor)"),
            Some("Project Manager")
        );
        assert_eq!(config.columns.canonical("Custom field (Project Manager)"), None);
        assert_eq!(config.taxonomy.categories().len(), 4);
    }

    #[test]
    fn test_layouts_for_category() {
        let config = ReportConfig::default();

        let requests = config.layouts_for("Project Requests");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].layout, LayoutRef::Index(2));
        assert_eq!(requests[1].layout, LayoutRef::Index(3));

        let deferred = config.layouts_for("Deferred Projects");
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].layout, LayoutRef::Index(2));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "partition_field": "Line of Business",
            "name_miss_policy": "pass-through",
            "taxonomy": [
                {"name": "Open", "statuses": ["New Request"]}
            ]
        }"#;

        let config = ReportConfig::from_json(json).unwrap();

        assert_eq!(config.partition_field, "Line of Business");
        assert_eq!(config.name_miss_policy, MissPolicy::PassThrough);
        assert_eq!(config.taxonomy.categories()[0].name, "Open");
        assert_eq!(config.sort_field, "Title");
        assert_eq!(config.layouts.len(), 2);
    }

    #[test]
    fn test_taxonomy_override_alone() {
        let json = r#"{
            "taxonomy": [
                {"name": "Project Requests", "statuses": ["New Request"]},
                {"name": "Approved Projects", "statuses": ["Approved"]}
            ]
        }"#;

        let config = ReportConfig::from_json(json).unwrap();

        assert!(config.category_layouts.is_empty());
        assert_eq!(config.layouts_for("Approved Projects").len(), 2);
    }

    #[test]
    fn test_taxonomy_override_keeps_matching_category_layouts() {
        let json = r#"{
            "taxonomy": [
                {"name": "Deferred Projects", "statuses": ["On Hold"]}
            ]
        }"#;

        let config = ReportConfig::from_json(json).unwrap();

        assert_eq!(config.layouts_for("Deferred Projects").len(), 1);
    }

    #[test]
    fn test_json_layout_with_fan_out() {
        let json = r#"{
            "layouts": {
                "overview": {
                    "layout": "Approval Overview",
                    "title_slot": 0,
                    "fields": [
                        {"field": "Key", "slot": 27},
                        {"field": "Line of Business", "slot": [21, 22]}
                    ]
                },
                "detail": {"layout": 3}
            }
        }"#;

        let config = ReportConfig::from_json(json).unwrap();
        let overview = &config.layouts["overview"];

        assert_eq!(overview.layout, LayoutRef::Name("Approval Overview".to_string()));
        assert_eq!(
            overview.slot_for("Line of Business"),
            Some(&Slot::Multiple(vec![SlotId(21), SlotId(22)]))
        );
    }

    #[test]
    fn test_unknown_layout_reference_rejected() {
        let json = r#"{"default_layouts": ["overview", "appendix"]}"#;
        assert!(matches!(
            ReportConfig::from_json(json),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r#"{"category_layouts": {"Nope": ["overview"]}}"#;
        assert!(matches!(
            ReportConfig::from_json(json),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_duplicate_status_in_json_rejected() {
        let json = r#"{
            "taxonomy": [
                {"name": "A", "statuses": ["Open"]},
                {"name": "B", "statuses": ["Open"]}
            ]
        }"#;
        assert!(matches!(
            ReportConfig::from_json(json),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            ReportConfig::from_json("{not json"),
            Err(Error::ConfigError(_))
        ));
    }
}
