//! アイテム表
//!
//! 名前・ID・分類・メタバリエーション・属性の参照を提供します。
//! エンジンは構築時にのみこの表を参照し、判定時には使用しません。

use crate::error::{DoctrineError, Result};
use crate::model::{ItemCategory, ItemType, TypeId};
use regex::RegexBuilder;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// 外部のアイテムカタログ
pub trait ItemLookup {
    /// 名前の完全一致で ID を取得
    fn id_of(&self, name: &str) -> Option<TypeId>;

    /// `%` (任意の文字列) と `_` (任意の1文字) を使った曖昧検索 (大文字小文字を区別しない)
    fn ids_like(&self, pattern: &str) -> Vec<TypeId>;

    fn name_of(&self, id: TypeId) -> Option<&str>;

    fn category_of(&self, id: TypeId) -> Option<ItemCategory>;

    /// 同じファミリーに属するアイテムとそのメタレベル
    ///
    /// ファミリーが1アイテムしかない場合は None
    fn type_variations(&self, id: TypeId) -> Option<BTreeMap<TypeId, i64>>;

    fn attribute(&self, id: TypeId, attribute: i32) -> Option<f64>;

    /// 使用にスキルが必要なアイテム → スキルID → レベル
    fn skill_requirements(&self) -> BTreeMap<TypeId, BTreeMap<TypeId, u8>> {
        BTreeMap::new()
    }
}

/// 名前を ID に解決 (見つからなければ設定エラー)
pub fn resolve(items: &dyn ItemLookup, name: &str) -> Result<TypeId> {
    items
        .id_of(name)
        .ok_or_else(|| DoctrineError::ItemNotFound(name.to_string()))
}

/// 名前またはパターンを ID 集合に解決
///
/// `%` を含む場合は曖昧検索として扱い、1件以上一致する必要があります。
pub fn resolve_pattern(items: &dyn ItemLookup, pattern: &str) -> Result<BTreeSet<TypeId>> {
    if pattern.contains('%') {
        let ids: BTreeSet<TypeId> = items.ids_like(pattern).into_iter().collect();
        if ids.is_empty() {
            return Err(DoctrineError::ItemNotFound(pattern.to_string()));
        }
        debug!(pattern = %pattern, matches = ids.len(), "Resolved item pattern");
        Ok(ids)
    } else {
        Ok(BTreeSet::from([resolve(items, pattern)?]))
    }
}

/// 宣言から構築される不変のアイテム表
#[derive(Debug, Clone, Default)]
pub struct StaticItemDb {
    types: BTreeMap<TypeId, ItemType>,
    by_name: HashMap<String, TypeId>,
    /// ファミリーの親 → 子
    children: BTreeMap<TypeId, Vec<TypeId>>,
}

impl StaticItemDb {
    pub fn new(items: impl IntoIterator<Item = ItemType>) -> Result<Self> {
        let mut db = Self::default();

        for item in items {
            if db.types.contains_key(&item.id) {
                return Err(DoctrineError::DuplicateDeclaration(format!(
                    "item {}",
                    item.id
                )));
            }
            if db.by_name.contains_key(&item.name) {
                return Err(DoctrineError::DuplicateDeclaration(format!(
                    "item '{}'",
                    item.name
                )));
            }
            db.by_name.insert(item.name.clone(), item.id);
            db.types.insert(item.id, item);
        }

        for item in db.types.values() {
            if let Some(parent) = item.parent {
                if !db.types.contains_key(&parent) {
                    return Err(DoctrineError::ItemNotFound(format!(
                        "{} (parent of '{}')",
                        parent, item.name
                    )));
                }
                db.children.entry(parent).or_default().push(item.id);
            }
            for skill in item.skill_requirements.keys() {
                if !db.types.contains_key(skill) {
                    return Err(DoctrineError::ItemNotFound(format!(
                        "{} (skill required by '{}')",
                        skill, item.name
                    )));
                }
            }
        }

        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<&ItemType> {
        self.types.get(&id)
    }

    fn meta_of(&self, id: TypeId) -> i64 {
        self.types.get(&id).and_then(|t| t.meta).unwrap_or(0)
    }
}

impl ItemLookup for StaticItemDb {
    fn id_of(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    fn ids_like(&self, pattern: &str) -> Vec<TypeId> {
        let mut expr = String::from("^");
        for ch in pattern.chars() {
            match ch {
                '%' => expr.push_str(".*"),
                '_' => expr.push('.'),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let Ok(re) = RegexBuilder::new(&expr).case_insensitive(true).build() else {
            return Vec::new();
        };
        self.types
            .values()
            .filter(|t| re.is_match(&t.name))
            .map(|t| t.id)
            .collect()
    }

    fn name_of(&self, id: TypeId) -> Option<&str> {
        self.types.get(&id).map(|t| t.name.as_str())
    }

    fn category_of(&self, id: TypeId) -> Option<ItemCategory> {
        self.types.get(&id).map(|t| t.category)
    }

    fn type_variations(&self, id: TypeId) -> Option<BTreeMap<TypeId, i64>> {
        let item = self.types.get(&id)?;
        let root = item.parent.unwrap_or(id);
        let children = self.children.get(&root)?;

        let mut family = BTreeMap::new();
        family.insert(root, self.meta_of(root));
        for &child in children {
            family.insert(child, self.meta_of(child));
        }
        Some(family)
    }

    fn attribute(&self, id: TypeId, attribute: i32) -> Option<f64> {
        self.types.get(&id)?.attributes.get(&attribute).copied()
    }

    fn skill_requirements(&self) -> BTreeMap<TypeId, BTreeMap<TypeId, u8>> {
        self.types
            .values()
            .filter(|t| !t.skill_requirements.is_empty())
            .map(|t| (t.id, t.skill_requirements.clone()))
            .collect()
    }
}
