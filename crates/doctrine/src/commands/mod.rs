pub mod categories;
pub mod decode;
pub mod encode;
pub mod evaluate;
pub mod validate;

use anyhow::Context;
use doctrine_core::{Doctrine, find_doctrine_root, load_doctrine, load_doctrine_from_root};
use std::path::{Path, PathBuf};

/// ドクトリンルートを決定 (--data が優先)
pub fn doctrine_root(data: Option<&Path>) -> anyhow::Result<PathBuf> {
    match data {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(find_doctrine_root()?),
    }
}

/// 設定ファイルとルールファイルを読み込んでエンジンを構築
pub fn load(data: Option<&Path>) -> anyhow::Result<Doctrine> {
    let settings = doctrine_config::load_settings().context("エンジン設定の読み込みに失敗しました")?;
    let doctrine = match data {
        Some(root) => load_doctrine_from_root(root, settings)
            .with_context(|| format!("ドクトリンの読み込みに失敗しました: {}", root.display()))?,
        None => load_doctrine(settings)?,
    };
    Ok(doctrine)
}
