use super::TypeId;
use std::collections::BTreeMap;

/// アイテムの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Ship,
    Module,
    Charge,
    Drone,
    Implant,
    Skill,
    Other,
}

impl ItemCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ship" => Some(Self::Ship),
            "module" => Some(Self::Module),
            "charge" => Some(Self::Charge),
            "drone" => Some(Self::Drone),
            "implant" => Some(Self::Implant),
            "skill" => Some(Self::Skill),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// 常にカーゴとして扱われる分類 (弾薬・ブースター類)
    pub fn is_always_cargo(self) -> bool {
        matches!(self, Self::Charge | Self::Implant)
    }
}

/// アイテム定義
#[derive(Debug, Clone, PartialEq)]
pub struct ItemType {
    pub id: TypeId,
    pub name: String,
    pub category: ItemCategory,
    /// メタバリエーションの親 (T1) アイテム
    pub parent: Option<TypeId>,
    pub meta: Option<i64>,
    /// 属性ID → 値
    pub attributes: BTreeMap<i32, f64>,
    /// 使用に必要なスキル ID → レベル
    pub skill_requirements: BTreeMap<TypeId, u8>,
}

impl ItemType {
    pub fn new(id: TypeId, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            parent: None,
            meta: None,
            attributes: BTreeMap::new(),
            skill_requirements: BTreeMap::new(),
        }
    }
}
