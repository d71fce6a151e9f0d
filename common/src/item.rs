//! アノテーション対象アイテムの保持
//!
//! 複数のソース表を指定順に連結し、連結後の順序で位置を採番する。
//! 読み込み後は不変。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// アノテーション対象（ツイート1件）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub position: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Item {
    /// 本文が空白のみか
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 1ソース分のテキスト列
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    /// ログ表示用の名前（ファイル名など）
    pub name: String,
    /// このソースの行に付与するカテゴリ
    pub category: Option<String>,
    pub rows: Vec<String>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, category: Option<String>, rows: Vec<String>) -> Self {
        Self {
            name: name.into(),
            category,
            rows,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    /// ソース表を連結して読み込む
    ///
    /// 空白のみの行も位置を詰めずにそのまま保持する（保存済みの `tweet_id` がずれないように）。
    /// 本文のある行が1つもなければ `Error::Load`。
    pub fn load(tables: Vec<SourceTable>) -> Result<Self> {
        let mut items = Vec::new();

        for table in tables {
            let category = table
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            for text in table.rows {
                items.push(Item {
                    position: items.len(),
                    text,
                    category: category.clone(),
                });
            }
        }

        if items.iter().all(Item::is_blank) {
            return Err(Error::Load("no source yielded any item".into()));
        }

        Ok(Self { items })
    }

    /// 本文のあるアイテム数
    pub fn text_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_blank()).count()
    }

    pub fn get(&self, position: usize) -> Result<&Item> {
        self.items.get(position).ok_or(Error::NotFound(position))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(category: Option<&str>, rows: &[&str]) -> SourceTable {
        SourceTable::new("test", category.map(String::from), rows.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn test_load_zero_sources() {
        let result = ItemStore::load(Vec::new());
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_load_only_empty_sources() {
        let result = ItemStore::load(vec![table(None, &[]), table(Some("Transparansi"), &["  "])]);
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_positions_follow_concatenated_order() {
        let store = ItemStore::load(vec![
            table(Some("Kebijakan Pemerintah"), &["a", "b"]),
            table(Some("Transparansi"), &["c"]),
        ])
        .unwrap();

        assert_eq!(store.len(), 3);
        let c = store.get(2).unwrap();
        assert_eq!(c.position, 2);
        assert_eq!(c.text, "c");
        assert_eq!(c.category.as_deref(), Some("Transparansi"));
        assert_eq!(store.get(0).unwrap().category.as_deref(), Some("Kebijakan Pemerintah"));
    }

    #[test]
    fn test_category_absent_without_tag() {
        let store = ItemStore::load(vec![table(None, &["x"]), table(Some(" "), &["y"])]).unwrap();
        assert!(store.iter().all(|item| item.category.is_none()));
    }

    #[test]
    fn test_blank_rows_keep_their_position() {
        let store = ItemStore::load(vec![table(None, &["a", "", "c"]), table(None, &["  ", "e"])]).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(store.text_count(), 3);
        assert!(store.get(1).unwrap().is_blank());
        let c = store.get(2).unwrap();
        assert_eq!(c.position, 2);
        assert_eq!(c.text, "c");
        assert_eq!(store.get(4).unwrap().text, "e");
    }

    #[test]
    fn test_get_not_found() {
        let store = ItemStore::load(vec![table(None, &["a"])]).unwrap();
        assert!(matches!(store.get(1), Err(Error::NotFound(1))));
    }
}
