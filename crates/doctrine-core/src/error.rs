use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoctrineError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("ファイル発見エラー: {path}\n理由: {message}")]
    DiscoveryError { path: PathBuf, message: String },

    #[error(
        "ドクトリンルートが見つかりません\n探索開始位置: {0}\nヒント: doctrine.kdl ファイルを含むディレクトリで実行してください"
    )]
    DoctrineRootNotFound(PathBuf),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("アイテムが見つかりません: {0}")]
    ItemNotFound(String),

    #[error("重複した宣言: {0}")]
    DuplicateDeclaration(String),

    #[error("矛盾する置換宣言: {0}")]
    ContradictoryEquivalence(String),

    #[error("置換ルールに循環が検出されました: {0}")]
    CircularEquivalence(String),

    #[error("フィット '{name}' の DNA が不正です: {source}")]
    TemplateDna { name: String, source: ParseError },

    #[error("フィットテンプレートの自己検証に失敗しました: {name}\n理由: {reason}")]
    TemplateSelfCheck { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DoctrineError>;

/// 提出されたフィット (DNA / エクスポートテキスト) の構文エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("船体IDが不正です: '{0}'")]
    InvalidHull(String),

    #[error("アイテムトークンが不正です: '{0}'")]
    InvalidToken(String),

    #[error("個数が不正です: '{0}'")]
    InvalidCount(String),

    #[error("アイテム数が上限 ({limit}) を超えています")]
    TooManyItems { limit: usize },

    #[error("フィットのヘッダー行 ([船体, フィット名]) がありません")]
    MissingHeader,

    #[error("不明なアイテム名です: '{0}'")]
    UnknownItem(String),
}
