use super::TypeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// スキル要件の階層
///
/// gold が最上位で、未設定の elite は min、未設定の gold は elite で補完されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Min,
    Elite,
    Gold,
}

/// 1スキル分の階層別しきい値
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkillThresholds {
    pub min: Option<u8>,
    pub elite: Option<u8>,
    pub gold: Option<u8>,
}

impl SkillThresholds {
    /// 上位階層を下位から補完
    pub fn backfilled(self) -> Self {
        let elite = self.elite.or(self.min);
        let gold = self.gold.or(elite);
        Self {
            min: self.min,
            elite,
            gold,
        }
    }

    pub fn get(&self, tier: SkillTier) -> Option<u8> {
        match tier {
            SkillTier::Min => self.min,
            SkillTier::Elite => self.elite,
            SkillTier::Gold => self.gold,
        }
    }

    /// min <= elite <= gold を満たすか
    pub fn is_monotonic(&self) -> bool {
        let ordered = |lower: Option<u8>, upper: Option<u8>| match (lower, upper) {
            (Some(lower), Some(upper)) => lower <= upper,
            (Some(_), None) => false,
            _ => true,
        };
        ordered(self.min, self.elite) && ordered(self.elite, self.gold)
    }
}

/// キャラクターの習得スキルレベル (スキルID → レベル)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SkillLevels(BTreeMap<TypeId, u8>);

impl SkillLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未習得のスキルは 0
    pub fn get(&self, skill: TypeId) -> u8 {
        self.0.get(&skill).copied().unwrap_or(0)
    }

    pub fn set(&mut self, skill: TypeId, level: u8) {
        self.0.insert(skill, level);
    }
}

impl FromIterator<(TypeId, u8)> for SkillLevels {
    fn from_iter<I: IntoIterator<Item = (TypeId, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
