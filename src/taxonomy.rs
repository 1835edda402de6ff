//! Defines [`Taxonomy`], the lookup from two-level classification names
//! (lv1, lv2) to URL-safe slugs. Lookups never fail: a name the table
//! doesn't know resolves to [`Slug::Fallback`], so callers always get a
//! usable path component.

use std::collections::HashMap;

/// Display name and slug for records without an lv1 classification.
pub const FALLBACK_LV1: &str = "uncategorized";

/// Display name and slug for records without an lv2 classification.
pub const FALLBACK_LV2: &str = "misc";

const BUILTIN_LV1: [(&str, &str); 3] = [
    ("ストラテジ系", "strategy"),
    ("マネジメント系", "management"),
    ("テクノロジ系", "technology"),
];

const BUILTIN_LV2: [(&str, &str); 14] = [
    ("企業と法務", "corporate-law"),
    ("経営戦略", "business-strategy"),
    ("マーケティング", "marketing"),
    ("財務", "finance"),
    ("事業継続", "business-continuity"),
    ("開発技術", "development"),
    ("プロジェクトマネジメント", "project-management"),
    ("サービスマネジメント", "service-management"),
    ("基礎理論", "fundamentals"),
    ("コンピュータシステム", "computer-systems"),
    ("ネットワーク", "network"),
    ("データベース", "database"),
    ("セキュリティ", "security"),
    ("新技術・先端技術", "emerging-tech"),
];

/// The classification level a slug belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Lv1,
    Lv2,
}

/// The result of a [`Taxonomy`] lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slug<'a> {
    /// The name was found in the table.
    Known(&'a str),

    /// The name was missing or unknown.
    Fallback(Level),
}

impl<'a> Slug<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            Slug::Known(slug) => slug,
            Slug::Fallback(Level::Lv1) => FALLBACK_LV1,
            Slug::Fallback(Level::Lv2) => FALLBACK_LV2,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Slug::Fallback(_))
    }
}

/// Name-to-slug tables for both classification levels.
#[derive(Clone, Debug)]
pub struct Taxonomy {
    lv1: HashMap<String, String>,
    lv2: HashMap<String, String>,
}

impl Default for Taxonomy {
    /// The built-in tables.
    fn default() -> Self {
        fn table(entries: &[(&str, &str)]) -> HashMap<String, String> {
            entries
                .iter()
                .map(|(name, slug)| ((*name).to_owned(), (*slug).to_owned()))
                .collect()
        }
        Taxonomy {
            lv1: table(&BUILTIN_LV1),
            lv2: table(&BUILTIN_LV2),
        }
    }
}

impl Taxonomy {
    /// Adds or replaces entries on top of the built-in tables. An entry with
    /// a blank slug gets one derived from its name with [`slug::slugify`].
    pub fn with_overrides<I, J>(lv1: I, lv2: J) -> Taxonomy
    where
        I: IntoIterator<Item = (String, String)>,
        J: IntoIterator<Item = (String, String)>,
    {
        let mut taxonomy = Taxonomy::default();
        for (name, slug) in lv1 {
            taxonomy.insert(Level::Lv1, name, slug);
        }
        for (name, slug) in lv2 {
            taxonomy.insert(Level::Lv2, name, slug);
        }
        taxonomy
    }

    fn insert(&mut self, level: Level, name: String, slug: String) {
        let name = name.trim().to_owned();
        let slug = match slug.trim() {
            "" => slug::slugify(&name),
            s => s.to_owned(),
        };
        // A name that slugifies to nothing (e.g., only punctuation) would
        // produce an empty path component; leave it to the fallback.
        if name.is_empty() || slug.is_empty() {
            return;
        }
        match level {
            Level::Lv1 => self.lv1.insert(name, slug),
            Level::Lv2 => self.lv2.insert(name, slug),
        };
    }

    /// Looks up the slug for an lv1 name.
    pub fn lv1(&self, name: Option<&str>) -> Slug {
        Self::lookup(&self.lv1, name, Level::Lv1)
    }

    /// Looks up the slug for an lv2 name.
    pub fn lv2(&self, name: Option<&str>) -> Slug {
        Self::lookup(&self.lv2, name, Level::Lv2)
    }

    /// Resolves a record's taxonomy path (index 0 = lv1, index 1 = lv2) into
    /// a slug pair.
    pub fn path(&self, taxonomy: &[String]) -> (Slug, Slug) {
        (
            self.lv1(taxonomy.first().map(String::as_str)),
            self.lv2(taxonomy.get(1).map(String::as_str)),
        )
    }

    fn lookup<'a>(
        table: &'a HashMap<String, String>,
        name: Option<&str>,
        level: Level,
    ) -> Slug<'a> {
        match name.map(str::trim).and_then(|name| table.get(name)) {
            Some(slug) => Slug::Known(slug),
            None => Slug::Fallback(level),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let taxonomy = Taxonomy::default();
        assert_eq!(Slug::Known("technology"), taxonomy.lv1(Some("テクノロジ系")));
        assert_eq!(Slug::Known("network"), taxonomy.lv2(Some("ネットワーク")));
    }

    #[test]
    fn test_fallback() {
        let taxonomy = Taxonomy::default();
        let slug = taxonomy.lv1(Some("宇宙系"));
        assert!(slug.is_fallback());
        assert_eq!("uncategorized", slug.as_str());
        assert_eq!("misc", taxonomy.lv2(None).as_str());
    }

    #[test]
    fn test_path() {
        let taxonomy = Taxonomy::default();
        let (lv1, lv2) = taxonomy.path(&["ストラテジ系".to_owned()]);
        assert_eq!("strategy", lv1.as_str());
        assert_eq!(Slug::Fallback(Level::Lv2), lv2);
    }

    #[test]
    fn test_overrides() {
        let taxonomy = Taxonomy::with_overrides(
            vec![
                ("Strategy".to_owned(), "strat".to_owned()),
                ("Home Lab".to_owned(), String::new()),
                ("???".to_owned(), String::new()),
            ],
            vec![("財務".to_owned(), "money".to_owned())],
        );
        assert_eq!("strat", taxonomy.lv1(Some("Strategy")).as_str());
        assert_eq!("home-lab", taxonomy.lv1(Some("Home Lab")).as_str());
        assert!(taxonomy.lv1(Some("???")).is_fallback());
        assert_eq!("money", taxonomy.lv2(Some("財務")).as_str());
        assert_eq!("management", taxonomy.lv1(Some("マネジメント系")).as_str());
    }
}
