//! Sites and scene capabilities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// In-game location reachable by rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    Shoggolith,
    Brcl,
    Mander,
    Wilderness,
    Onederland,
    Clarity,
    Freeport,
    AnitaWeapon,
    AnitaEnergy,
    AnitaRocket,
}

impl Site {
    /// Every site, in catalog order
    pub const ALL: [Site; 10] = [
        Site::Shoggolith,
        Site::Brcl,
        Site::Mander,
        Site::Wilderness,
        Site::Onederland,
        Site::Clarity,
        Site::Freeport,
        Site::AnitaWeapon,
        Site::AnitaEnergy,
        Site::AnitaRocket,
    ];

    /// Name as printed on the station sign and the rail map
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Shoggolith => "修格里城",
            Self::Brcl => "铁盟哨站",
            Self::Mander => "曼德矿场",
            Self::Wilderness => "荒原站",
            Self::Onederland => "淘金乐园",
            Self::Clarity => "澄明数据中心",
            Self::Freeport => "7号自由港",
            Self::AnitaWeapon => "阿妮塔战备工厂",
            Self::AnitaEnergy => "阿妮塔能源研究所",
            Self::AnitaRocket => "阿妮塔发射中心",
        }
    }

    /// ASCII identifier used on the command line and in config files
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Shoggolith => "shoggolith",
            Self::Brcl => "brcl",
            Self::Mander => "mander",
            Self::Wilderness => "wilderness",
            Self::Onederland => "onederland",
            Self::Clarity => "clarity",
            Self::Freeport => "freeport",
            Self::AnitaWeapon => "anita_weapon",
            Self::AnitaEnergy => "anita_energy",
            Self::AnitaRocket => "anita_rocket",
        }
    }

    /// Look a site up by its display name
    #[must_use]
    pub fn from_display_name(name: &str) -> Option<Site> {
        Self::ALL.into_iter().find(|s| s.display_name() == name)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Unknown site name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown site: {0}")]
pub struct ParseSiteError(pub String);

impl FromStr for Site {
    type Err = ParseSiteError;

    /// Accepts either the ASCII key or the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|site| site.key() == s || site.display_name() == s)
            .ok_or_else(|| ParseSiteError(s.to_string()))
    }
}

/// What a scene lets the player do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Station main view; rail departures start here
    Hub,
    Urban,
    SecurityOffice,
    ExpulsionBoard,
    Exchange,
    ExchangeBuy,
    ExchangeSell,
    Guild,
    OrderBoard,
}

impl Capability {
    /// Suffix appended to the site name to form the scene name
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Hub => "主界面",
            Self::Urban => "市区",
            Self::SecurityOffice => "铁安局",
            Self::ExpulsionBoard => "驱逐任务",
            Self::Exchange => "交易所",
            Self::ExchangeBuy => "交易所购买",
            Self::ExchangeSell => "交易所售出",
            Self::Guild => "商会",
            Self::OrderBoard => "商会订单",
        }
    }

    /// Canonical scene name for a site
    #[must_use]
    pub fn scene_name(self, site: Site) -> String {
        format!("{}{}", site.display_name(), self.suffix())
    }
}
