use super::Loadout;
use serde::Serialize;

/// テンプレートの階層 (名前のキーワードからロード時に決定)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateTier {
    Unranked,
    Starter,
    Basic,
    Advanced,
    Elite,
}

impl TemplateTier {
    /// 名前に含まれるキーワード (大文字小文字を区別しない) から階層を決定
    ///
    /// 複数含まれる場合は上位の階層を優先します。
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("elite") {
            Self::Elite
        } else if lower.contains("advanced") {
            Self::Advanced
        } else if lower.contains("basic") {
            Self::Basic
        } else if lower.contains("starter") {
            Self::Starter
        } else {
            Self::Unranked
        }
    }
}

/// フィットテンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitTemplate {
    pub name: String,
    pub loadout: Loadout,
    pub tier: TemplateTier,
    /// ハイブリッドインプラント専用
    pub is_hybrid: bool,
    /// アミュレットインプラント専用
    pub is_amulet: bool,
}

impl FitTemplate {
    pub fn new(name: impl Into<String>, loadout: Loadout) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        Self {
            tier: TemplateTier::from_name(&name),
            is_hybrid: lower.contains("hybrid"),
            is_amulet: lower.contains("amulet"),
            name,
            loadout,
        }
    }

    pub fn is_elite(&self) -> bool {
        self.tier == TemplateTier::Elite
    }

    pub fn is_advanced(&self) -> bool {
        self.tier == TemplateTier::Advanced
    }

    pub fn is_basic(&self) -> bool {
        self.tier == TemplateTier::Basic
    }

    pub fn is_starter(&self) -> bool {
        self.tier == TemplateTier::Starter
    }
}
