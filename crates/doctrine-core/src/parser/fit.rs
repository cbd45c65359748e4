//! フィットテンプレートのパース

use super::{args, first_string};
use crate::error::{DoctrineError, Result};
use crate::model::FitDeclaration;
use kdl::KdlNode;
use regex::Regex;

/// fit ノードをパース
///
/// ```kdl
/// fit "ELITE Nightmare" "17736:3057;4:19327;1::"
/// ```
pub fn parse_fit(node: &KdlNode) -> Result<FitDeclaration> {
    let name = first_string(node, "fit")?;
    let dna = args(node)
        .nth(1)
        .and_then(|v| v.as_string())
        .ok_or_else(|| DoctrineError::InvalidConfig(format!("fit '{}' requires a DNA", name)))?
        .to_string();
    Ok(FitDeclaration { name, dna })
}

/// ゲーム内チャットのフィットリンク (`<a href="fitting:DNA">名前</a>`) を抽出
pub fn parse_fit_links(content: &str) -> Result<Vec<FitDeclaration>> {
    let link_re = Regex::new(r#"<a href="fitting:([0-9:;_]+)">([^<]+)</a>"#)
        .map_err(|e| DoctrineError::InvalidConfig(format!("正規表現のコンパイルエラー: {}", e)))?;

    Ok(link_re
        .captures_iter(content)
        .map(|caps| FitDeclaration {
            name: caps[2].trim().to_string(),
            dna: caps[1].to_string(),
        })
        .collect())
}
