//! アイテムノードのパース

use super::{args, children, narrow, prop_integer, prop_string, skill_level};
use crate::error::{DoctrineError, Result};
use crate::model::{ItemCategory, ItemType, TypeId};
use kdl::KdlNode;

/// item ノードをパース
///
/// ```kdl
/// item 12084 "500MN Microwarpdrive II" category="module" parent=12076 meta=5 {
///     attribute 20 505.0
///     require 3452 4
/// }
/// ```
pub fn parse_item(node: &KdlNode) -> Result<ItemType> {
    let mut positional = args(node);
    let id = positional
        .next()
        .and_then(|v| v.as_integer())
        .ok_or_else(|| DoctrineError::InvalidConfig("item requires an id".to_string()))?;
    let id = type_id(id)?;

    let name = positional
        .next()
        .and_then(|v| v.as_string())
        .ok_or_else(|| DoctrineError::InvalidConfig(format!("item {} requires a name", id)))?
        .to_string();

    let category = match prop_string(node, "category") {
        Some(value) => ItemCategory::parse(&value).ok_or_else(|| {
            DoctrineError::InvalidConfig(format!("item '{}': unknown category '{}'", name, value))
        })?,
        None => ItemCategory::Module,
    };

    let mut item = ItemType::new(id, name, category);
    item.parent = prop_integer(node, "parent").map(type_id).transpose()?;
    item.meta = prop_integer(node, "meta")
        .map(|meta| narrow(meta, &format!("item '{}': meta", item.name)))
        .transpose()?;

    for child in children(node) {
        match child.name().value() {
            "attribute" => parse_attribute(child, &mut item)?,
            "require" => parse_require(child, &mut item)?,
            _ => {}
        }
    }

    Ok(item)
}

fn parse_attribute(node: &KdlNode, item: &mut ItemType) -> Result<()> {
    let mut values = args(node);
    let attribute = values.next().and_then(|v| v.as_integer());
    let value = values
        .next()
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)));
    let (Some(attribute), Some(value)) = (attribute, value) else {
        return Err(DoctrineError::InvalidConfig(format!(
            "item '{}': attribute requires an id and a value",
            item.name
        )));
    };
    let attribute = narrow(attribute, &format!("item '{}': attribute id", item.name))?;
    item.attributes.insert(attribute, value);
    Ok(())
}

/// `require <スキルID> <レベル>`
fn parse_require(node: &KdlNode, item: &mut ItemType) -> Result<()> {
    let mut values = args(node).filter_map(|v| v.as_integer());
    let (Some(skill), Some(level)) = (values.next(), values.next()) else {
        return Err(DoctrineError::InvalidConfig(format!(
            "item '{}': require needs a skill id and a level",
            item.name
        )));
    };
    let skill = type_id(skill)?;
    let level = skill_level(level, &format!("item '{}'", item.name))?;
    item.skill_requirements.insert(skill, level);
    Ok(())
}

fn type_id(value: i128) -> Result<TypeId> {
    narrow(value, "type id")
}
