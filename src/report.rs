use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ThemeSettings;
use crate::embedded::Embedded;
use crate::page::Page;

/// Theme collection type tags
const THEME_TYPE_BASE: i64 = 2;
const THEME_TYPE_CUSTOM: i64 = 1;

/// Resource package and item type tags
const PACKAGE_SHARED: i64 = 2;
const PACKAGE_REGISTERED: i64 = 1;
const ITEM_BASE_THEME: i64 = 202;
const ITEM_CUSTOM_THEME: i64 = 201;

/// Root of the report definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub config: Embedded,
    pub layout_optimization: i64,
    pub resource_packages: Vec<ResourcePackageEntry>,
    pub sections: Vec<Page>,
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePackageEntry {
    pub resource_package: ResourcePackage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePackage {
    pub disabled: bool,
    pub items: Vec<ResourceItem>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: i64,
}

/// Report-level config document (serialized into `config`)
pub fn report_config(theme: &ThemeSettings) -> Value {
    json!({
        "version": theme.config_version,
        "themeCollection": {
            "baseTheme": { "name": theme.base_theme, "version": theme.theme_version, "type": THEME_TYPE_BASE },
            "customTheme": { "name": theme.custom_theme, "version": theme.theme_version, "type": THEME_TYPE_CUSTOM },
        },
        "activeSectionIndex": 0,
        "defaultDrillFilterOtherVisuals": true,
        "linguisticSchemaSyncVersion": 2,
        "settings": {
            "useNewFilterPaneExperience": true,
            "allowChangeFilterTypes": true,
            "useStylableVisualContainerHeader": true,
            "queryLimitOption": 6,
            "useEnhancedTooltips": true,
            "exportDataMode": 1,
            "useDefaultAggregateDisplayName": true,
        },
    })
}

/// Bindings for the base theme shipped with the application and the
/// registered custom theme file
pub fn resource_packages(theme: &ThemeSettings) -> Vec<ResourcePackageEntry> {
    vec![
        ResourcePackageEntry {
            resource_package: ResourcePackage {
                disabled: false,
                items: vec![ResourceItem {
                    name: theme.base_theme.clone(),
                    path: format!("BaseThemes/{}.json", theme.base_theme),
                    kind: ITEM_BASE_THEME,
                }],
                name: "SharedResources".to_string(),
                kind: PACKAGE_SHARED,
            },
        },
        ResourcePackageEntry {
            resource_package: ResourcePackage {
                disabled: false,
                items: vec![ResourceItem {
                    name: theme.custom_theme.clone(),
                    path: theme.custom_theme.clone(),
                    kind: ITEM_CUSTOM_THEME,
                }],
                name: "RegisteredResources".to_string(),
                kind: PACKAGE_REGISTERED,
            },
        },
    ]
}

/// Combine report settings and pages into the root document
pub fn assemble(theme: &ThemeSettings, pages: Vec<Page>) -> ReportDocument {
    ReportDocument {
        config: Embedded::from_value(&report_config(theme)),
        layout_optimization: 0,
        resource_packages: resource_packages(theme),
        sections: pages,
        theme: theme.custom_theme.clone(),
    }
}

impl ReportDocument {
    pub fn visual_count(&self) -> usize {
        self.sections.iter().map(|p| p.visual_containers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageBuilder;

    #[test]
    fn test_report_config_versions() {
        let config = report_config(&ThemeSettings::default());
        assert_eq!(config["version"], "5.44");
        assert_eq!(config["themeCollection"]["baseTheme"]["version"], "5.46");
        assert_eq!(config["themeCollection"]["customTheme"]["type"], 1);
        assert_eq!(config["settings"]["queryLimitOption"], 6);
    }

    #[test]
    fn test_resource_packages() {
        let theme = ThemeSettings::default();
        let packages = resource_packages(&theme);
        assert_eq!(packages.len(), 2);

        let v = serde_json::to_value(&packages).unwrap();
        assert_eq!(v[0]["resourcePackage"]["name"], "SharedResources");
        assert_eq!(v[0]["resourcePackage"]["type"], 2);
        assert_eq!(v[0]["resourcePackage"]["items"][0]["path"], "BaseThemes/CY23SU08.json");
        assert_eq!(v[0]["resourcePackage"]["items"][0]["type"], 202);
        assert_eq!(v[1]["resourcePackage"]["name"], "RegisteredResources");
        assert_eq!(v[1]["resourcePackage"]["items"][0]["type"], 201);
    }

    #[test]
    fn test_assemble_top_level_shape() {
        let theme = ThemeSettings::default();
        let pages = vec![
            PageBuilder::new("a", "A").build(),
            PageBuilder::new("b", "B").ordinal(1).build(),
        ];
        let report = assemble(&theme, pages);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.theme, theme.custom_theme);
        assert_eq!(report.visual_count(), 0);

        let v = serde_json::to_value(&report).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["config", "layoutOptimization", "resourcePackages", "sections", "theme"]);
        assert!(v["config"].is_string());
    }
}
