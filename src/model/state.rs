use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Value of the `state` attribute of a `<target>`.
///
/// Unknown or missing values read as [`TargetState::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    #[default]
    None,
    New,
    Translated,
    SignedOff,
    NeedsAdaptation,
    #[serde(rename = "needs-l10n")]
    NeedsL10n,
    NeedsReviewAdaptation,
    #[serde(rename = "needs-review-l10n")]
    NeedsReviewL10n,
    NeedsReviewTranslation,
    NeedsTranslation,
    Final,
}

impl TargetState {
    pub const ALL: [TargetState; 11] = [
        TargetState::None,
        TargetState::New,
        TargetState::Translated,
        TargetState::SignedOff,
        TargetState::NeedsAdaptation,
        TargetState::NeedsL10n,
        TargetState::NeedsReviewAdaptation,
        TargetState::NeedsReviewL10n,
        TargetState::NeedsReviewTranslation,
        TargetState::NeedsTranslation,
        TargetState::Final,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetState::None => "none",
            TargetState::New => "new",
            TargetState::Translated => "translated",
            TargetState::SignedOff => "signed-off",
            TargetState::NeedsAdaptation => "needs-adaptation",
            TargetState::NeedsL10n => "needs-l10n",
            TargetState::NeedsReviewAdaptation => "needs-review-adaptation",
            TargetState::NeedsReviewL10n => "needs-review-l10n",
            TargetState::NeedsReviewTranslation => "needs-review-translation",
            TargetState::NeedsTranslation => "needs-translation",
            TargetState::Final => "final",
        }
    }

    /// Reads an attribute value, falling back to `None` for anything
    /// unrecognized.
    pub fn from_attr(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::ALL.iter().find(|state| state.as_str() == v))
            .copied()
            .unwrap_or_default()
    }

    /// SDL confirmation levels are not mapped.
    pub fn from_sdl(_value: &str) -> Self {
        TargetState::None
    }

    /// Translated, signed off or final.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            TargetState::Translated | TargetState::SignedOff | TargetState::Final
        )
    }
}

impl Display for TargetState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parsing, used where a user typed the value.
impl FromStr for TargetState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .find(|state| state.as_str() == normalized)
            .copied()
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}
