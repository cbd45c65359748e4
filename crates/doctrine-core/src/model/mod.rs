//! モデル定義
//!
//! コンプライアンスエンジンで使用されるデータモデルを定義します。
//! 各モデルは機能ごとにモジュールに分離されています。

mod decision;
mod document;
mod item;
mod loadout;
mod settings;
mod skill;
mod template;

// Re-exports
pub use decision::*;
pub use document::*;
pub use item::*;
pub use loadout::*;
pub use settings::*;
pub use skill::*;
pub use template::*;
