//! KDLパーサー
//!
//! ドクトリンのルールファイルをパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod category;
mod fit;
mod implant;
mod item;
mod module;
mod skill;

use category::{parse_category, parse_category_rule};
use fit::parse_fit;
use implant::{parse_implant_set, parse_implant_slot, parse_required_implant};
use item::parse_item;
use module::{parse_attribute_rule, parse_cargo_override, parse_meta_family, parse_tier_groups};
use skill::{parse_module_skills, parse_skill_plan};

pub use fit::parse_fit_links;

use crate::error::{DoctrineError, Result};
use crate::model::DoctrineDocument;
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::fs;
use std::path::Path;
use tracing::warn;

/// KDLファイルをパース
pub fn parse_doctrine_file<P: AsRef<Path>>(path: P) -> Result<DoctrineDocument> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| DoctrineError::IoError {
        path: path.as_ref().to_path_buf(),
        message: e.to_string(),
    })?;
    parse_doctrine_string(&content)
}

/// KDL文字列をパース
pub fn parse_doctrine_string(content: &str) -> Result<DoctrineDocument> {
    let doc: KdlDocument = content.parse()?;
    let mut document = DoctrineDocument::default();

    for node in doc.nodes() {
        match node.name().value() {
            "item" => document.items.push(parse_item(node)?),
            "alternatives" => document.tier_groups.extend(parse_tier_groups(node, true)?),
            "no-downgrade" => document.tier_groups.extend(parse_tier_groups(node, false)?),
            "from-meta" => document.meta_families.push(parse_meta_family(node, true)?),
            "from-meta-no-downgrade" => {
                document.meta_families.push(parse_meta_family(node, false)?)
            }
            "from-attribute" => document.attribute_rules.push(parse_attribute_rule(node)?),
            "accept-t1" => document.accept_t1.extend(string_args(node)),
            "identification" => document.identification.extend(string_args(node)),
            "banned" => document.banned.extend(string_args(node)),
            "cargo-ignore" => document.cargo_ignore.extend(string_args(node)),
            "cargo-override" => document.cargo_overrides.push(parse_cargo_override(node)?),
            "fit" => document.fits.push(parse_fit(node)?),
            "skills" => document.skill_plans.push(parse_skill_plan(node)?),
            "tank-floor" => document.tank_floor.extend(string_args(node)),
            "require-skills" => document.module_skills.push(parse_module_skills(node)?),
            "implant-set" => document.implant_sets.push(parse_implant_set(node)?),
            "implant-slot" => document.implant_slots.push(parse_implant_slot(node)?),
            "required-implant" => {
                document.required_implants.push(parse_required_implant(node)?)
            }
            "category" => document.categories.push(parse_category(node)?),
            "category-rule" => document.category_rules.push(parse_category_rule(node)?),
            "default-category" => {
                document.default_category = Some(first_string(node, "default-category")?)
            }
            "protected-category" => {
                document.protected_category = Some(first_string(node, "protected-category")?)
            }
            "doctrine" => {
                // ルートマーカー
            }
            other => {
                warn!(node = %other, "Unknown top-level node, skipping");
            }
        }
    }

    Ok(document)
}

/// 名前なしエントリ (引数) の値
fn args(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value())
}

/// 文字列引数をすべて取得
fn string_args(node: &KdlNode) -> Vec<String> {
    args(node)
        .filter_map(|v| v.as_string().map(|s| s.to_string()))
        .collect()
}

/// 先頭の文字列引数 (必須)
fn first_string(node: &KdlNode, what: &str) -> Result<String> {
    args(node)
        .next()
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| DoctrineError::InvalidConfig(format!("{} requires a name", what)))
}

/// プロパティ値
fn prop<'a>(node: &'a KdlNode, key: &str) -> Option<&'a KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .map(|e| e.value())
}

fn prop_string(node: &KdlNode, key: &str) -> Option<String> {
    prop(node, key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn prop_integer(node: &KdlNode, key: &str) -> Option<i128> {
    prop(node, key).and_then(|v| v.as_integer())
}

/// 整数値を目的の型へ変換 (範囲外は設定エラー)
fn narrow<T: TryFrom<i128>>(value: i128, what: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| DoctrineError::InvalidConfig(format!("{} out of range: {}", what, value)))
}

/// スキルレベル (0-5) への変換
fn skill_level(value: i128, context: &str) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|level| *level <= 5)
        .ok_or_else(|| {
            DoctrineError::InvalidConfig(format!("{}: skill level must be 0-5, got {}", context, value))
        })
}

/// 子ノードの反復 (子ブロックがなければ空)
fn children(node: &KdlNode) -> impl Iterator<Item = &KdlNode> {
    node.children().into_iter().flat_map(|doc| doc.nodes().iter())
}
