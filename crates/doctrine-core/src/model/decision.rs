use super::{ItemCounts, TypeId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// クライアント表示用のフィット差分
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FitCheckDetail {
    /// 一致したテンプレート名
    pub name: String,
    pub missing: ItemCounts,
    pub extra: ItemCounts,
    /// 期待アイテム → 代替アイテム → 個数
    pub downgraded: BTreeMap<TypeId, ItemCounts>,
    pub cargo_missing: ItemCounts,
    /// 上記マップに現れる全アイテムID (昇順)
    pub ids: Vec<TypeId>,
}

/// エンジンの判定結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceDecision {
    pub approved: bool,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub errors: Vec<String>,
    pub fit_check: Option<FitCheckDetail>,
}

impl ComplianceDecision {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
