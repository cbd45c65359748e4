//! ファイル自動発見機能
//!
//! 規約ベースのディレクトリ構造からドクトリンのルールファイルを発見します。

use crate::error::{DoctrineError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// ルートを指定する環境変数
pub const ROOT_ENV: &str = "DOCTRINE_ROOT";

const ROOT_FILE: &str = "doctrine.kdl";
const DOT_ROOT_FILE: &str = ".doctrine/doctrine.kdl";

/// 発見されたファイル群
#[derive(Debug, Clone, Default)]
pub struct DiscoveredFiles {
    /// ルートファイル (doctrine.kdl)
    pub root: Option<PathBuf>,
    /// アイテム表 (items/**/*.kdl)
    pub items: Vec<PathBuf>,
    /// 置換・スキル・インプラント・カテゴリルール (rules/**/*.kdl)
    pub rules: Vec<PathBuf>,
    /// フィットテンプレート (fits/**/*.kdl)
    pub fits: Vec<PathBuf>,
    /// フィッティングリンク (fits/**/*.dat)
    pub fit_links: Vec<PathBuf>,
}

impl DiscoveredFiles {
    /// KDL ファイルを読み込み順に列挙
    pub fn kdl_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.root
            .iter()
            .chain(&self.items)
            .chain(&self.rules)
            .chain(&self.fits)
    }
}

fn has_root_file(dir: &Path) -> bool {
    dir.join(ROOT_FILE).exists() || dir.join(DOT_ROOT_FILE).exists()
}

/// ドクトリンルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 DOCTRINE_ROOT
/// 2. カレントディレクトリから上に向かって以下を探す:
///    - doctrine.kdl
///    - .doctrine/doctrine.kdl
#[tracing::instrument]
pub fn find_doctrine_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var(ROOT_ENV) {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking DOCTRINE_ROOT");
        if has_root_file(&path) {
            info!(doctrine_root = %path.display(), "Found doctrine root from environment variable");
            return Ok(path);
        }
    }

    let start_dir = std::env::current_dir()?;
    find_doctrine_root_from(&start_dir)
}

/// 指定ディレクトリから上に向かってドクトリンルートを探す
pub fn find_doctrine_root_from(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();
    debug!(start_dir = %start_dir.display(), "Searching for doctrine root");

    loop {
        if has_root_file(&current) {
            info!(doctrine_root = %current.display(), "Found doctrine root");
            return Ok(current);
        }
        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Doctrine root not found");
    Err(DoctrineError::DoctrineRootNotFound(start_dir.to_path_buf()))
}

/// ドクトリンルートからファイルを自動発見
#[tracing::instrument(skip(doctrine_root), fields(doctrine_root = %doctrine_root.display()))]
pub fn discover_files(doctrine_root: &Path) -> Result<DiscoveredFiles> {
    debug!("Starting file discovery");
    let mut discovered = DiscoveredFiles::default();

    let root_file = doctrine_root.join(ROOT_FILE);
    let dot_root_file = doctrine_root.join(DOT_ROOT_FILE);
    if root_file.exists() {
        debug!(file = %root_file.display(), "Found root file");
        discovered.root = Some(root_file);
    } else if dot_root_file.exists() {
        debug!(file = %dot_root_file.display(), "Found root file in .doctrine/");
        discovered.root = Some(dot_root_file);
    }

    discovered.items = discover_in(doctrine_root, "items", "kdl")?;
    discovered.rules = discover_in(doctrine_root, "rules", "kdl")?;
    discovered.fits = discover_in(doctrine_root, "fits", "kdl")?;
    discovered.fit_links = discover_in(doctrine_root, "fits", "dat")?;

    info!(
        items = discovered.items.len(),
        rules = discovered.rules.len(),
        fits = discovered.fits.len(),
        fit_links = discovered.fit_links.len(),
        "Discovered doctrine files"
    );

    Ok(discovered)
}

fn discover_in(doctrine_root: &Path, subdir: &str, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = doctrine_root.join(subdir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    discover_files_with_extension(&dir, extension)
}

/// ディレクトリ配下の指定拡張子のファイルを再帰的に発見
///
/// アルファベット順にソートして返す
fn discover_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();

    visit_dir(dir, extension, &mut files, &mut visited)?;
    files.sort();

    Ok(files)
}

/// ディレクトリを再帰的に走査
fn visit_dir(
    dir: &Path,
    extension: &str,
    files: &mut Vec<PathBuf>,
    visited: &mut HashSet<PathBuf>,
) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    // 正規化されたパスでループを検出
    let canonical_dir = dir.canonicalize().map_err(|e| DoctrineError::DiscoveryError {
        path: dir.to_path_buf(),
        message: format!("パスの正規化に失敗: {}", e),
    })?;

    if !visited.insert(canonical_dir.clone()) {
        warn!(dir = %canonical_dir.display(), "Symlink loop detected, skipping");
        return Ok(());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| DoctrineError::DiscoveryError {
        path: dir.to_path_buf(),
        message: format!("ディレクトリの読み込みに失敗: {}", e),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| DoctrineError::DiscoveryError {
            path: dir.to_path_buf(),
            message: format!("ディレクトリエントリの読み込みに失敗: {}", e),
        })?;
        let path = entry.path();

        if path.is_dir() {
            visit_dir(&path, extension, files, visited)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some(extension) {
            files.push(path);
        }
    }

    Ok(())
}
