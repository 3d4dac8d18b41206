//! Pest and disease alerts.

use serde::{Deserialize, Serialize};

/// Image kind the detail page uses as its preview.
pub const SYMPTOM_IMAGE_KIND: &str = "병증상";

/// Pest alerts for a crop (`GET /pests?cropName=`), each a pest name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PestAlerts {
    #[serde(default, alias = "foreCasts")]
    pub forecasts: Vec<String>,
    #[serde(default)]
    pub advisories: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PestAlerts {
    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty() && self.advisories.is_empty() && self.warnings.is_empty()
    }

    /// Every alerted pest, most severe level first, without repeats.
    pub fn all(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self
            .warnings
            .iter()
            .chain(&self.advisories)
            .chain(&self.forecasts)
        {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
        names
    }
}

/// An image attached to a pest detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PestImage {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_title: Option<String>,
    /// Image kind, e.g. `병증상` (symptom) or `해충` (pest).
    #[serde(default, rename = "iemSpchcknNm")]
    pub kind: Option<String>,
}

/// Pest detail (`GET /pests/{pestName}?cropName=`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PestDetail {
    pub sick_name_kor: String,
    pub sick_name_chn: String,
    pub sick_name_eng: String,
    pub crop_name: String,
    pub development_condition: String,
    pub symptoms: String,
    pub prevention_method: String,
    pub image_list: Vec<PestImage>,
}

impl PestDetail {
    /// First symptom image, used as the page preview.
    pub fn preview_image(&self) -> Option<&PestImage> {
        self.image_list
            .iter()
            .find(|image| image.kind.as_deref() == Some(SYMPTOM_IMAGE_KIND))
    }
}
