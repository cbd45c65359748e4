//! カテゴリノードのパース

use super::{args, first_string, narrow, prop_integer, prop_string};
use crate::error::{DoctrineError, Result};
use crate::model::{CategoryDecl, CategoryRuleDecl};
use kdl::KdlNode;

/// category ノードをパース
///
/// 表示名を省略した場合は ID をそのまま使います。
pub fn parse_category(node: &KdlNode) -> Result<CategoryDecl> {
    let id = first_string(node, "category")?;
    let name = args(node)
        .nth(1)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .unwrap_or_else(|| id.clone());
    Ok(CategoryDecl { id, name })
}

/// category-rule ノードをパース
///
/// ```kdl
/// category-rule "500MN Microwarpdrive I" category="dps" min-meta=11
/// ```
pub fn parse_category_rule(node: &KdlNode) -> Result<CategoryRuleDecl> {
    let item = first_string(node, "category-rule")?;
    let category = prop_string(node, "category").ok_or_else(|| {
        DoctrineError::InvalidConfig(format!("category-rule '{}' requires category=", item))
    })?;
    Ok(CategoryRuleDecl {
        item,
        category,
        min_meta: prop_integer(node, "min-meta")
            .map(|v| narrow(v, "category-rule: min-meta"))
            .transpose()?,
        max_meta: prop_integer(node, "max-meta")
            .map(|v| narrow(v, "category-rule: max-meta"))
            .transpose()?,
    })
}
