//! ルールファイルから読み込んだ宣言
//!
//! 名前はまだ解決されておらず、エンジン構築時にアイテム表で ID に変換されます。

use super::ItemType;

/// 明示的な階層グループ (インデックス = 階層)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierGroup {
    pub tiers: Vec<Vec<String>>,
    /// false の場合、ダウングレード方向の代替を生成しない
    pub allow_downgrade: bool,
}

/// メタファミリー由来の代替
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaFamilyRule {
    pub base: String,
    pub abyssal: Option<String>,
    pub alternative: Option<String>,
    pub allow_downgrade: bool,
}

/// 属性値の順位から階層を決める代替
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRule {
    pub attribute: i32,
    pub descending: bool,
    pub bases: Vec<String>,
}

/// 期待カーゴの差し替え
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CargoOverrideRule {
    pub detect: String,
    pub remove: Vec<String>,
    pub add: Vec<(String, i64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitDeclaration {
    pub name: String,
    pub dna: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillRequirementDecl {
    pub skill: String,
    pub min: Option<u8>,
    pub elite: Option<u8>,
    pub gold: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillPlanDecl {
    pub ship: String,
    pub skills: Vec<SkillRequirementDecl>,
}

/// 特定モジュール装備時のみ要求されるタンクスキル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSkillDecl {
    pub module: String,
    pub skills: Vec<(String, u8)>,
}

/// スロット1-6の名前付きインプラントセット
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImplantSetDecl {
    pub name: String,
    /// 全て装着している必要があるパターン
    pub pieces: Vec<String>,
    /// "amulet" / "hybrid"
    pub unlocks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotAcceptDecl {
    pub pattern: String,
    /// 空の場合は全船体で有効
    pub ships: Vec<String>,
}

/// スロット7-10の判定ルール
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImplantSlotDecl {
    pub slot: u8,
    pub accepts: Vec<SlotAcceptDecl>,
    pub waived_ships: Vec<String>,
    /// どの accept にも登場しない船体はこのスロットを免除
    pub waive_unlisted: bool,
    /// 他のスロットが揃っていてこのスロットだけ欠けている場合のタグ
    pub missing_tag: Option<String>,
}

/// 船体固有の必須インプラント
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredImplantDecl {
    pub pattern: String,
    pub tag: String,
    pub ships: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDecl {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRuleDecl {
    pub item: String,
    pub category: String,
    pub min_meta: Option<i64>,
    pub max_meta: Option<i64>,
}

/// ドクトリン全体の宣言
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctrineDocument {
    pub items: Vec<ItemType>,
    pub tier_groups: Vec<TierGroup>,
    pub meta_families: Vec<MetaFamilyRule>,
    pub attribute_rules: Vec<AttributeRule>,
    pub accept_t1: Vec<String>,
    pub identification: Vec<String>,
    pub banned: Vec<String>,
    pub cargo_ignore: Vec<String>,
    pub cargo_overrides: Vec<CargoOverrideRule>,
    pub fits: Vec<FitDeclaration>,
    pub skill_plans: Vec<SkillPlanDecl>,
    pub tank_floor: Vec<String>,
    pub module_skills: Vec<ModuleSkillDecl>,
    pub implant_sets: Vec<ImplantSetDecl>,
    pub implant_slots: Vec<ImplantSlotDecl>,
    pub required_implants: Vec<RequiredImplantDecl>,
    pub categories: Vec<CategoryDecl>,
    pub category_rules: Vec<CategoryRuleDecl>,
    pub default_category: Option<String>,
    pub protected_category: Option<String>,
}
