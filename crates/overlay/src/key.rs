use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 入口網站可呈現的所有覆蓋面板。 / Every overlay panel the portal can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKey {
    Access,
    Help,
    InteractiveMap,
    Map,
    Legislation,
    Incident,
    Waste,
    Participation,
    BulkyWaste,
    PublicConsultations,
    LegislationInfo,
    HowToParticipate,
    InteractiveMapsInfo,
    IncidentRegistrationInfo,
    About,
    Faq,
    Terms,
    Privacy,
    Support,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overlay identifier '{0}'")]
pub struct UnknownOverlayKey(pub String);

impl OverlayKey {
    pub const ALL: [OverlayKey; 19] = [
        OverlayKey::Access,
        OverlayKey::Help,
        OverlayKey::InteractiveMap,
        OverlayKey::Map,
        OverlayKey::Legislation,
        OverlayKey::Incident,
        OverlayKey::Waste,
        OverlayKey::Participation,
        OverlayKey::BulkyWaste,
        OverlayKey::PublicConsultations,
        OverlayKey::LegislationInfo,
        OverlayKey::HowToParticipate,
        OverlayKey::InteractiveMapsInfo,
        OverlayKey::IncidentRegistrationInfo,
        OverlayKey::About,
        OverlayKey::Faq,
        OverlayKey::Terms,
        OverlayKey::Privacy,
        OverlayKey::Support,
    ];

    /// 穩定的識別字串。 / Stable identifier used by call sites and catalogs.
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayKey::Access => "access",
            OverlayKey::Help => "help",
            OverlayKey::InteractiveMap => "interactive-map",
            OverlayKey::Map => "map",
            OverlayKey::Legislation => "legislation",
            OverlayKey::Incident => "incident",
            OverlayKey::Waste => "waste",
            OverlayKey::Participation => "participation",
            OverlayKey::BulkyWaste => "bulky-waste",
            OverlayKey::PublicConsultations => "public-consultations",
            OverlayKey::LegislationInfo => "legislation-info",
            OverlayKey::HowToParticipate => "how-to-participate",
            OverlayKey::InteractiveMapsInfo => "interactive-maps-info",
            OverlayKey::IncidentRegistrationInfo => "incident-registration-info",
            OverlayKey::About => "about",
            OverlayKey::Faq => "faq",
            OverlayKey::Terms => "terms",
            OverlayKey::Privacy => "privacy",
            OverlayKey::Support => "support",
        }
    }

    /// 面板標題的在地化鍵。 / Localization key holding the overlay title.
    pub fn title_key(self) -> String {
        format!("overlay.{}.title", self.as_str())
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayKey {
    type Err = UnknownOverlayKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        OverlayKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == trimmed)
            .ok_or_else(|| UnknownOverlayKey(trimmed.to_string()))
    }
}
