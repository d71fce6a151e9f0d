//! 編集中ラベル台帳
//!
//! アイテム位置ごとに (アスペクト → 感情) を挿入順で保持する。
//! 同じアスペクトを再設定した場合は元の位置のまま値だけ上書きする。
//! 確定済み履歴には触れない。
//!
//! 保存形式は `{"item_<位置>": {アスペクト: 感情, ...}}`。
//! 旧版の `tweet_<位置>` キーも読み込める。

use crate::types::{LabelEntry, Sentiment};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const KEY_PREFIX: &str = "item_";
const LEGACY_KEY_PREFIX: &str = "tweet_";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelLedger {
    items: BTreeMap<usize, Vec<LabelEntry>>,
}

impl LabelLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// ラベルを追加（既存アスペクトは上書き）
    pub fn set(&mut self, item_position: usize, aspect: &str, sentiment: Sentiment) {
        let aspect = aspect.trim();
        let entries = self.items.entry(item_position).or_default();
        match entries.iter_mut().find(|e| e.aspect == aspect) {
            Some(entry) => entry.sentiment = sentiment,
            None => entries.push(LabelEntry::new(aspect, sentiment)),
        }
    }

    /// ラベルを削除。存在しなければ何もしない
    pub fn remove(&mut self, item_position: usize, aspect: &str) -> bool {
        let aspect = aspect.trim();
        let Some(entries) = self.items.get_mut(&item_position) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.aspect != aspect);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.items.remove(&item_position);
        }
        removed
    }

    /// 読み取り専用のコピー
    pub fn snapshot(&self, item_position: usize) -> Vec<LabelEntry> {
        self.entries(item_position).to_vec()
    }

    pub fn entries(&self, item_position: usize) -> &[LabelEntry] {
        self.items
            .get(&item_position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, item_position: usize, aspect: &str) -> Option<Sentiment> {
        let aspect = aspect.trim();
        self.entries(item_position)
            .iter()
            .find(|e| e.aspect == aspect)
            .map(|e| e.sentiment)
    }

    /// 未追加の選択をマージした内容を返す
    ///
    /// 選択中のアスペクトが既に台帳にある場合は台帳側を優先する。
    pub fn merge_pending(&self, item_position: usize, pending: Option<LabelEntry>) -> Vec<LabelEntry> {
        let mut merged = self.snapshot(item_position);
        if let Some(pending) = pending {
            let aspect = pending.aspect.trim();
            if !merged.iter().any(|e| e.aspect == aspect) {
                merged.push(LabelEntry::new(aspect, pending.sentiment));
            }
        }
        merged
    }

    /// アイテムの台帳を置き換える
    pub fn replace(&mut self, item_position: usize, entries: Vec<LabelEntry>) {
        self.items.remove(&item_position);
        for entry in entries {
            self.set(item_position, &entry.aspect, entry.sentiment);
        }
    }

    pub fn has_entries(&self, item_position: usize) -> bool {
        !self.entries(item_position).is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.keys().copied()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct OrderedEntries<'a>(&'a [LabelEntry]);

impl Serialize for OrderedEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.aspect, &entry.sentiment)?;
        }
        map.end()
    }
}

impl Serialize for LabelLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (position, entries) in &self.items {
            map.serialize_entry(&format!("{KEY_PREFIX}{position}"), &OrderedEntries(entries))?;
        }
        map.end()
    }
}

/// JSONオブジェクトの出現順を保ったまま読み込む
struct EntryList(Vec<LabelEntry>);

impl<'de> Deserialize<'de> for EntryList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryListVisitor;

        impl<'de> Visitor<'de> for EntryListVisitor {
            type Value = EntryList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of aspect to sentiment")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EntryList, A::Error> {
                let mut entries: Vec<LabelEntry> = Vec::new();
                while let Some((aspect, sentiment)) = access.next_entry::<String, Sentiment>()? {
                    let aspect = aspect.trim().to_string();
                    match entries.iter_mut().find(|e| e.aspect == aspect) {
                        Some(entry) => entry.sentiment = sentiment,
                        None => entries.push(LabelEntry::new(aspect, sentiment)),
                    }
                }
                Ok(EntryList(entries))
            }
        }

        deserializer.deserialize_map(EntryListVisitor)
    }
}

fn parse_key(key: &str) -> Option<usize> {
    key.strip_prefix(KEY_PREFIX)
        .or_else(|| key.strip_prefix(LEGACY_KEY_PREFIX))
        .and_then(|n| n.parse().ok())
}

impl<'de> Deserialize<'de> for LabelLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LedgerVisitor;

        impl<'de> Visitor<'de> for LedgerVisitor {
            type Value = LabelLedger;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map keyed by item_<position>")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LabelLedger, A::Error> {
                let mut ledger = LabelLedger::new();
                while let Some((key, list)) = access.next_entry::<String, EntryList>()? {
                    let position = parse_key(&key)
                        .ok_or_else(|| de::Error::custom(format!("invalid ledger key: {key}")))?;
                    if !list.0.is_empty() {
                        ledger.items.insert(position, list.0);
                    }
                }
                Ok(ledger)
            }
        }

        deserializer.deserialize_map(LedgerVisitor)
    }
}
