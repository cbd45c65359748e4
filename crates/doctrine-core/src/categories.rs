//! ウェイトリストカテゴリの割り当て

use crate::error::{DoctrineError, Result};
use crate::items::{ItemLookup, resolve};
use crate::model::{CategoryDecl, CategoryRuleDecl, DoctrineDocument, Loadout, TypeId};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

const DEFAULT_CATEGORY: &str = "starter";

#[derive(Debug, Clone)]
struct CategoryRule {
    ids: BTreeSet<TypeId>,
    category: String,
}

#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    categories: Vec<CategoryDecl>,
    /// 宣言順 (最初に一致したルールを採用)
    rules: Vec<CategoryRule>,
    default: String,
    protected: Option<String>,
}

impl Categorizer {
    #[instrument(skip_all)]
    pub fn build(doc: &DoctrineDocument, items: &dyn ItemLookup) -> Result<Self> {
        let mut categories: Vec<CategoryDecl> = Vec::with_capacity(doc.categories.len() + 1);
        for decl in &doc.categories {
            if categories.iter().any(|c| c.id == decl.id) {
                return Err(DoctrineError::DuplicateDeclaration(format!(
                    "category '{}'",
                    decl.id
                )));
            }
            categories.push(decl.clone());
        }

        let default = match &doc.default_category {
            Some(id) => id.clone(),
            None => {
                if !categories.iter().any(|c| c.id == DEFAULT_CATEGORY) {
                    categories.push(CategoryDecl {
                        id: DEFAULT_CATEGORY.to_string(),
                        name: DEFAULT_CATEGORY.to_string(),
                    });
                }
                DEFAULT_CATEGORY.to_string()
            }
        };

        let declared = |id: &str| -> Result<()> {
            if categories.iter().any(|c| c.id == id) {
                Ok(())
            } else {
                Err(DoctrineError::InvalidConfig(format!(
                    "未定義のカテゴリです: '{}'",
                    id
                )))
            }
        };

        declared(&default)?;
        if let Some(protected) = &doc.protected_category {
            declared(protected)?;
        }

        let mut rules = Vec::with_capacity(doc.category_rules.len());
        for decl in &doc.category_rules {
            declared(&decl.category)?;
            let ids = rule_ids(decl, items)?;
            debug!(item = %decl.item, category = %decl.category, ids = ids.len(), "Category rule loaded");
            rules.push(CategoryRule {
                ids,
                category: decl.category.clone(),
            });
        }

        info!(categories = categories.len(), rules = rules.len(), "Category rules built");

        Ok(Self {
            categories,
            rules,
            default,
            protected: doc.protected_category.clone(),
        })
    }

    /// 船体または装備モジュールに最初に一致したルールのカテゴリ
    pub fn categorize(&self, loadout: &Loadout) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.ids.iter().any(|&id| loadout.fits_item(id)))
            .map(|rule| rule.category.as_str())
            .unwrap_or(&self.default)
    }

    pub fn default_category(&self) -> &str {
        &self.default
    }

    pub fn is_protected(&self, category: &str) -> bool {
        self.protected.as_deref() == Some(category)
    }

    pub fn categories(&self) -> &[CategoryDecl] {
        &self.categories
    }
}

/// メタ範囲付きのルールはファミリーのうち範囲内 (両端含む) のアイテムに展開
fn rule_ids(decl: &CategoryRuleDecl, items: &dyn ItemLookup) -> Result<BTreeSet<TypeId>> {
    let id = resolve(items, &decl.item)?;
    if decl.min_meta.is_none() && decl.max_meta.is_none() {
        return Ok(BTreeSet::from([id]));
    }

    let family = items.type_variations(id).ok_or_else(|| {
        DoctrineError::ItemNotFound(format!("meta variations of '{}'", decl.item))
    })?;
    let min = decl.min_meta.unwrap_or(i64::MIN);
    let max = decl.max_meta.unwrap_or(i64::MAX);
    Ok(family
        .into_iter()
        .filter(|(_, meta)| (min..=max).contains(meta))
        .map(|(id, _)| id)
        .collect())
}
