//! エンジンのチューニング定数

use serde::Deserialize;

use super::TemplateTier;

/// カーゴの許容量
///
/// 期待数が `min_quantity` 以上のカーゴ行は、不足数が期待数の
/// `missing_percent`% 以下であれば満たされたものとみなします。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CargoLeeway {
    pub min_quantity: i64,
    pub missing_percent: i64,
}

impl Default for CargoLeeway {
    fn default() -> Self {
        Self {
            min_quantity: 10,
            missing_percent: 70,
        }
    }
}

/// テンプレート階層ごとの自動承認に必要なフリート滞在時間 (時間)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeInFleetHours {
    pub elite: i64,
    pub advanced: i64,
    pub basic: i64,
    pub starter: i64,
}

impl Default for TimeInFleetHours {
    fn default() -> Self {
        Self {
            elite: 150,
            advanced: 150,
            basic: 50,
            starter: 0,
        }
    }
}

impl TimeInFleetHours {
    /// 階層なしのテンプレートは basic と同じ扱い
    pub fn for_tier(&self, tier: TemplateTier) -> i64 {
        match tier {
            TemplateTier::Elite => self.elite,
            TemplateTier::Advanced => self.advanced,
            TemplateTier::Basic | TemplateTier::Unranked => self.basic,
            TemplateTier::Starter => self.starter,
        }
    }
}

/// 耐性補正スキルの下限レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TankFloor {
    pub default: u8,
    pub starter: u8,
}

impl Default for TankFloor {
    fn default() -> Self {
        Self {
            default: 4,
            starter: 2,
        }
    }
}

impl TankFloor {
    pub fn for_tier(&self, tier: Option<TemplateTier>) -> u8 {
        match tier {
            Some(TemplateTier::Starter) => self.starter,
            _ => self.default,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub cargo_leeway: CargoLeeway,
    pub time_in_fleet_hours: TimeInFleetHours,
    pub tank_floor: TankFloor,
}
