//! 統合ローダー
//!
//! ファイル発見、パース、エンジン構築を統合

use crate::discovery::{DiscoveredFiles, discover_files, find_doctrine_root};
use crate::engine::ComplianceEngine;
use crate::error::{DoctrineError, Result};
use crate::items::StaticItemDb;
use crate::model::{DoctrineDocument, EngineSettings};
use crate::parser::{parse_doctrine_string, parse_fit_links};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// ファイルあたりの推定バイト数（容量事前確保用）
const ESTIMATED_BYTES_PER_FILE: usize = 2000;

/// 読み込み済みのドクトリン
#[derive(Debug, Clone)]
pub struct Doctrine {
    pub root: PathBuf,
    pub items: StaticItemDb,
    pub engine: ComplianceEngine,
}

/// ドクトリン全体をロードしてエンジンを構築
///
/// 以下の処理を実行:
/// 1. ドクトリンルートの検出
/// 2. ファイルの自動発見
/// 3. KDLパース
/// 4. アイテム表とエンジンの構築 (自己検証を含む)
#[instrument(skip(settings))]
pub fn load_doctrine(settings: EngineSettings) -> Result<Doctrine> {
    info!("Starting doctrine load");
    let doctrine_root = find_doctrine_root()?;
    load_doctrine_from_root(&doctrine_root, settings)
}

/// 指定されたルートディレクトリからドクトリンをロード
#[instrument(skip(doctrine_root, settings), fields(doctrine_root = %doctrine_root.display()))]
pub fn load_doctrine_from_root(doctrine_root: &Path, settings: EngineSettings) -> Result<Doctrine> {
    let mut document = load_document_from_root(doctrine_root)?;
    build_doctrine(doctrine_root, &mut document, settings)
}

/// ルール宣言のみを読み込む (エンジンは構築しない)
#[instrument(skip(doctrine_root), fields(doctrine_root = %doctrine_root.display()))]
pub fn load_document_from_root(doctrine_root: &Path) -> Result<DoctrineDocument> {
    debug!("Step 1: Discovering files");
    let discovered = discover_files(doctrine_root)?;
    if discovered.root.is_none() {
        return Err(DoctrineError::DoctrineRootNotFound(doctrine_root.to_path_buf()));
    }

    debug!("Step 2: Concatenating KDL files");
    let content = concat_kdl_files(&discovered)?;

    debug!("Step 3: Parsing KDL");
    let mut document = parse_doctrine_string(&content)?;

    for link_file in &discovered.fit_links {
        let content = read_file(link_file)?;
        let fits = parse_fit_links(&content)?;
        debug!(file = %link_file.display(), fits = fits.len(), "Fitting links loaded");
        document.fits.extend(fits);
    }

    info!(
        items = document.items.len(),
        fits = document.fits.len(),
        skill_plans = document.skill_plans.len(),
        "Doctrine parsed"
    );
    Ok(document)
}

fn build_doctrine(
    doctrine_root: &Path,
    document: &mut DoctrineDocument,
    settings: EngineSettings,
) -> Result<Doctrine> {
    debug!("Step 4: Building tables");
    let items = StaticItemDb::new(std::mem::take(&mut document.items))?;
    let engine = ComplianceEngine::build(document, &items, settings)?;
    info!(
        items = items.len(),
        templates = engine.catalog().len(),
        "Doctrine loaded successfully"
    );

    Ok(Doctrine {
        root: doctrine_root.to_path_buf(),
        items,
        engine,
    })
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| DoctrineError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// 全 KDL ファイルを結合 (ルートファイルが先頭)
fn concat_kdl_files(discovered: &DiscoveredFiles) -> Result<String> {
    let file_count = discovered.kdl_files().count();
    let mut content = String::with_capacity(file_count * ESTIMATED_BYTES_PER_FILE);

    for file in discovered.kdl_files() {
        debug!(file = %file.display(), "Reading KDL file");
        content.push_str(&read_file(file)?);
        content.push_str("\n\n");
    }

    Ok(content)
}

/// デバッグ情報を表示しながらロード
pub fn load_doctrine_with_debug(doctrine_root: &Path, settings: EngineSettings) -> Result<Doctrine> {
    println!("🔍 ドクトリン検出");
    println!("  ルート: {}", doctrine_root.display());

    let discovered = discover_files(doctrine_root)?;
    match &discovered.root {
        Some(root) => println!("  doctrine.kdl: ✓ 検出 ({})", root.display()),
        None => println!("  doctrine.kdl: ✗ 未検出"),
    }

    for (label, files) in [
        ("items/", &discovered.items),
        ("rules/", &discovered.rules),
        ("fits/", &discovered.fits),
        ("fits/*.dat", &discovered.fit_links),
    ] {
        if files.is_empty() {
            continue;
        }
        println!("\n📂 ファイル発見 ({})", label);
        for file in files {
            println!("  ✓ {}", file.display());
        }
    }

    println!("\n⚙️  KDLパース");
    let mut document = load_document_from_root(doctrine_root)?;
    println!("  アイテム: {}個", document.items.len());
    println!("  フィット: {}個", document.fits.len());
    println!("  スキルプラン: {}個", document.skill_plans.len());

    println!("\n🧮 テーブル構築");
    let doctrine = build_doctrine(doctrine_root, &mut document, settings)?;
    println!(
        "  置換ルール: {}モジュール",
        doctrine.engine.matcher().equivalence().len()
    );
    println!("  テンプレート自己検証: ✓ 完了");

    println!("\n✅ ロード完了\n");

    Ok(doctrine)
}
