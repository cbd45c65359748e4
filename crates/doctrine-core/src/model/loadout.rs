//! ロードアウト (船体 + モジュール + カーゴ)

use serde::Serialize;
use std::collections::BTreeMap;

/// アイテムの型ID
pub type TypeId = i32;

/// アイテムID → 個数
pub type ItemCounts = BTreeMap<TypeId, i64>;

/// 提出された、またはテンプレートとして定義されたフィット
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Loadout {
    pub ship: TypeId,
    pub modules: ItemCounts,
    pub cargo: ItemCounts,
}

impl Loadout {
    pub fn new(ship: TypeId) -> Self {
        Self {
            ship,
            ..Default::default()
        }
    }

    /// 正規化された DNA 文字列を生成
    ///
    /// `ship:` に続けてモジュール (`id;count:`)、カーゴ (`id_;count:`) を
    /// ID 昇順で並べ、末尾に `:` を付けます。
    pub fn to_dna(&self) -> String {
        let mut dna = format!("{}:", self.ship);
        for (id, count) in &self.modules {
            dna.push_str(&format!("{};{}:", id, count));
        }
        for (id, count) in &self.cargo {
            dna.push_str(&format!("{}_;{}:", id, count));
        }
        dna.push(':');
        dna
    }

    /// 船体とモジュールのいずれかに `id` が含まれているか
    pub fn fits_item(&self, id: TypeId) -> bool {
        self.ship == id || self.modules.get(&id).copied().unwrap_or(0) > 0
    }
}
