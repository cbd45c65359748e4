//! DNA コーデック
//!
//! `ship:id;count:id_;count::` 形式のロードアウト文字列と、
//! ゲーム内エクスポート形式 (`[船体, フィット名]` で始まるテキスト) を扱います。

use crate::error::ParseError;
use crate::items::ItemLookup;
use crate::model::{ItemCategory, Loadout, TypeId};
use std::collections::BTreeMap;

/// 1つの DNA に含められるトークン数の上限
pub const MAX_TOKENS: usize = 1000;

/// 1トークンあたりの個数の上限
pub const MAX_COUNT: i64 = 1_000_000_000;

/// この番号以降のセクションはカーゴ
const CARGO_SECTION: usize = 7;

/// スタックされたモジュールを非アクティブ扱いにする最初のセクション
const STACKED_CARGO_SECTION: usize = 4;

/// セクションの出力順
const SECTION_ORDER: [usize; 5] = [4, 0, 1, 2, 3];

/// DNA 文字列をロードアウトにデコード
pub fn decode(dna: &str) -> Result<Loadout, ParseError> {
    let mut tokens = dna.split(':');
    let hull_token = tokens.next().unwrap_or_default().trim();
    let ship: TypeId = hull_token
        .parse()
        .map_err(|_| ParseError::InvalidHull(hull_token.to_string()))?;

    let mut loadout = Loadout::new(ship);
    let mut count_tokens = 0;

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        count_tokens += 1;
        if count_tokens > MAX_TOKENS {
            return Err(ParseError::TooManyItems { limit: MAX_TOKENS });
        }

        let (id_part, count_part) = match token.split_once(';') {
            Some((id, count)) => (id, Some(count)),
            None => (token, None),
        };

        let (id_part, is_cargo) = match id_part.strip_suffix('_') {
            Some(stripped) => (stripped, true),
            None => (id_part, false),
        };

        let id: TypeId = id_part
            .parse()
            .map_err(|_| ParseError::InvalidToken(token.to_string()))?;

        let count: i64 = match count_part {
            None => 1,
            Some(count) => count
                .parse()
                .map_err(|_| ParseError::InvalidCount(token.to_string()))?,
        };
        if !(1..=MAX_COUNT).contains(&count) {
            return Err(ParseError::InvalidCount(token.to_string()));
        }

        let destination = if is_cargo {
            &mut loadout.cargo
        } else {
            &mut loadout.modules
        };
        let total = destination.entry(id).or_insert(0);
        *total = total
            .checked_add(count)
            .ok_or_else(|| ParseError::InvalidCount(token.to_string()))?;
    }

    Ok(loadout)
}

/// エクスポートテキストを1フィットごとに分割
///
/// `[船体, フィット名]` 行が新しいフィットの始まりです。
pub fn split_export(text: &str) -> Vec<String> {
    let mut fits: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if parse_header(line).is_some() {
            fits.push(String::new());
        }
        if let Some(current) = fits.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    fits
}

/// エクスポートテキストの先頭フィットを DNA にエンコード
pub fn encode(text: &str, items: &dyn ItemLookup) -> Result<String, ParseError> {
    let mut lines = text.lines().map(str::trim).skip_while(|l| l.is_empty());
    let hull_name = lines
        .next()
        .and_then(parse_header)
        .ok_or(ParseError::MissingHeader)?;
    let ship = items
        .id_of(hull_name)
        .ok_or_else(|| ParseError::UnknownItem(hull_name.to_string()))?;

    // セクション番号 → アイテム名 → (個数, スタック表記の有無)
    let mut sections: Vec<BTreeMap<String, (i64, bool)>> = vec![BTreeMap::new()];
    for line in lines {
        if parse_header(line).is_some() {
            // 2つ目以降のフィットは無視
            break;
        }
        if line.is_empty() {
            sections.push(BTreeMap::new());
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            // [Empty High slot] など
            continue;
        }

        let (name, count, stacked) = parse_item_line(line)?;
        if let Some(section) = sections.last_mut() {
            let entry = section.entry(name.to_string()).or_insert((0, false));
            entry.0 = entry
                .0
                .checked_add(count)
                .ok_or_else(|| ParseError::InvalidCount(line.to_string()))?;
            entry.1 |= stacked;
        }
    }

    let order = SECTION_ORDER
        .iter()
        .copied()
        .chain(SECTION_ORDER.len()..sections.len());

    let mut dna = format!("{}:", ship);
    for section_index in order {
        let Some(section) = sections.get(section_index) else {
            continue;
        };
        for (name, &(count, stacked)) in section {
            let id = items
                .id_of(name)
                .ok_or_else(|| ParseError::UnknownItem(name.clone()))?;
            let category = items.category_of(id).unwrap_or(ItemCategory::Other);

            let is_cargo = section_index >= CARGO_SECTION
                || category.is_always_cargo()
                || (stacked
                    && section_index >= STACKED_CARGO_SECTION
                    && category != ItemCategory::Drone);

            if is_cargo {
                dna.push_str(&format!("{}_;{}:", id, count));
            } else {
                dna.push_str(&format!("{};{}:", id, count));
            }
        }
    }
    dna.push(':');

    Ok(dna)
}

/// 複数フィットを含むエクスポートテキストを全てエンコード
pub fn encode_all(text: &str, items: &dyn ItemLookup) -> Result<Vec<String>, ParseError> {
    let fits = split_export(text);
    if fits.is_empty() {
        return Err(ParseError::MissingHeader);
    }
    fits.iter().map(|fit| encode(fit, items)).collect()
}

/// `[船体, フィット名]` から船体名を取り出す
fn parse_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let (hull, name) = inner.split_once(',')?;
    let hull = hull.trim();
    if hull.is_empty() || name.trim().is_empty() {
        return None;
    }
    Some(hull)
}

/// `名前` または `名前 xN`
fn parse_item_line(line: &str) -> Result<(&str, i64, bool), ParseError> {
    if let Some((name, count)) = line.rsplit_once(" x")
        && !count.is_empty()
        && count.chars().all(|c| c.is_ascii_digit())
    {
        let count: i64 = count
            .parse()
            .map_err(|_| ParseError::InvalidCount(line.to_string()))?;
        if !(1..=MAX_COUNT).contains(&count) {
            return Err(ParseError::InvalidCount(line.to_string()));
        }
        return Ok((name.trim(), count, true));
    }
    Ok((line, 1, false))
}
