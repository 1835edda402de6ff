//! Builds the category tree: for every category, the number of records under
//! each lv1/lv2 taxonomy pair, along with the slugs for each level. The tree
//! is persisted next to the global catalog so that category maps can be
//! rendered without re-walking the catalog.

use serde::Serialize;

use crate::record::CatalogRecord;
use crate::taxonomy::Taxonomy;

#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryNode {
    pub category: String,
    pub total: usize,
    pub groups: Vec<Lv1Node>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Lv1Node {
    pub name: String,
    pub slug: String,
    pub total: usize,
    pub children: Vec<Lv2Node>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Lv2Node {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Counts `records` by category, then lv1, then lv2. Every level keeps the
/// order in which its entries are first seen in `records`.
pub fn build_tree(records: &[CatalogRecord], taxonomy: &Taxonomy) -> Vec<CategoryNode> {
    let mut tree: Vec<CategoryNode> = Vec::new();

    for record in records {
        let i = match tree.iter().position(|n| n.category == record.category) {
            Some(i) => i,
            None => {
                tree.push(CategoryNode {
                    category: record.category.clone(),
                    total: 0,
                    groups: Vec::new(),
                });
                tree.len() - 1
            }
        };
        let category = &mut tree[i];
        category.total += 1;

        let (lv1_slug, lv2_slug) = taxonomy.path(&record.taxonomy);
        let j = match category.groups.iter().position(|n| n.name == record.lv1()) {
            Some(j) => j,
            None => {
                category.groups.push(Lv1Node {
                    name: record.lv1().to_owned(),
                    slug: lv1_slug.as_str().to_owned(),
                    total: 0,
                    children: Vec::new(),
                });
                category.groups.len() - 1
            }
        };
        let lv1 = &mut category.groups[j];
        lv1.total += 1;

        match lv1.children.iter_mut().find(|n| n.name == record.lv2()) {
            Some(lv2) => lv2.count += 1,
            None => lv1.children.push(Lv2Node {
                name: record.lv2().to_owned(),
                slug: lv2_slug.as_str().to_owned(),
                count: 1,
            }),
        }
    }

    tree
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn record(id: &str, category: &str, taxonomy: serde_json::Value) -> CatalogRecord {
        CatalogRecord::from_new_item(&json!({
            "id": id,
            "category": category,
            "timestamp": "2024-01-01",
            "post_path": format!("{}/posts/{}/", category, id),
            "meta": { "taxonomy": taxonomy },
        }))
        .unwrap()
    }

    #[test]
    fn test_build_tree() {
        let records = vec![
            record("a", "itpassport", json!(["テクノロジ系", "ネットワーク"])),
            record("b", "itpassport", json!(["テクノロジ系", "ネットワーク"])),
            record("c", "itpassport", json!(["テクノロジ系", "データベース"])),
            record("d", "itpassport", json!([])),
            record("e", "life", json!(["日記"])),
        ];
        let tree = build_tree(&records, &Taxonomy::default());

        assert_eq!(2, tree.len());
        let it = &tree[0];
        assert_eq!("itpassport", it.category);
        assert_eq!(4, it.total);
        assert_eq!(2, it.groups.len());

        let tech = &it.groups[0];
        assert_eq!("technology", tech.slug);
        assert_eq!(3, tech.total);
        assert_eq!(
            vec![
                Lv2Node {
                    name: "ネットワーク".to_owned(),
                    slug: "network".to_owned(),
                    count: 2,
                },
                Lv2Node {
                    name: "データベース".to_owned(),
                    slug: "database".to_owned(),
                    count: 1,
                },
            ],
            tech.children
        );

        let uncategorized = &it.groups[1];
        assert_eq!("uncategorized", uncategorized.name);
        assert_eq!("uncategorized", uncategorized.slug);
        assert_eq!("misc", uncategorized.children[0].slug);

        let life = &tree[1];
        assert_eq!("日記", life.groups[0].name);
        assert_eq!("uncategorized", life.groups[0].slug);
        assert_eq!("misc", life.groups[0].children[0].name);
    }
}
