use crate::taxonomy::Taxonomy;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE_NAME: &str = "trajectory.yaml";

const DEFAULT_SITE_TITLE: &str = "Learning Trajectory";

#[derive(Deserialize)]
struct DocsDirectory(PathBuf);
impl Default for DocsDirectory {
    fn default() -> Self {
        DocsDirectory(PathBuf::from("docs"))
    }
}

#[derive(Deserialize)]
struct SiteTitle(String);
impl Default for SiteTitle {
    fn default() -> Self {
        SiteTitle(DEFAULT_SITE_TITLE.to_owned())
    }
}

#[derive(Deserialize, Default)]
struct Project {
    #[serde(default)]
    docs_directory: DocsDirectory,

    #[serde(default)]
    site_title: SiteTitle,

    /// Paths relative to the docs directory; see [`Layout`].
    #[serde(default)]
    layout: Layout,

    /// Path to the category page template, relative to the project file.
    #[serde(default)]
    category_template: Option<PathBuf>,

    #[serde(default)]
    taxonomy: TaxonomyOverrides,
}

#[derive(Deserialize)]
#[serde(default)]
struct Layout {
    new_items: PathBuf,
    global_index: PathBuf,
    category_index: PathBuf,
    tree: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            new_items: PathBuf::from("data/new_items"),
            global_index: PathBuf::from("data/index.json"),
            category_index: PathBuf::from("data/index.json"),
            tree: PathBuf::from("data/tree.json"),
        }
    }
}

/// Extra lv1/lv2 name-to-slug entries, keyed by name. An empty slug is
/// derived from the name.
#[derive(Deserialize, Default)]
struct TaxonomyOverrides {
    #[serde(default)]
    lv1: BTreeMap<String, String>,
    #[serde(default)]
    lv2: BTreeMap<String, String>,
}

pub struct Config {
    /// The root of the published site.
    pub docs_directory: PathBuf,

    /// The directory holding new-item JSON files.
    pub new_items_directory: PathBuf,

    /// The global catalog file.
    pub global_index_path: PathBuf,

    /// The per-category catalog location relative to
    /// `{docs_directory}/{category}`.
    pub category_index_file: PathBuf,

    /// The category tree file.
    pub tree_path: PathBuf,

    pub site_title: String,

    /// The category page template; `None` selects
    /// [`crate::pages::DEFAULT_CATEGORY_TEMPLATE`].
    pub category_template: Option<PathBuf>,

    pub taxonomy: Taxonomy,
}

impl Config {
    /// Builds a default configuration rooted at `docs_directory`.
    pub fn with_docs_directory(docs_directory: &Path) -> Config {
        Config::from_project(Project::default(), Path::new(""), Some(docs_directory))
    }

    /// Searches `dir` and its ancestors for a [`PROJECT_FILE_NAME`] file and
    /// loads it. If none is found, the default configuration is used with the
    /// docs directory resolved against `dir`. `docs_override` replaces the
    /// configured docs directory either way.
    pub fn from_directory(dir: &Path, docs_override: Option<&Path>) -> Result<Config> {
        let mut candidate = Some(dir);
        while let Some(current) = candidate {
            let path = current.join(PROJECT_FILE_NAME);
            if path.is_file() {
                return Config::from_project_file(&path, docs_override)
                    .map_err(|e| anyhow!("Loading configuration: {:?}", e));
            }
            candidate = current.parent();
        }
        Ok(Config::from_project(Project::default(), dir, docs_override))
    }

    /// Loads the project file at `path`. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn from_project_file(path: &Path, docs_override: Option<&Path>) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config::from_project(project, project_root, docs_override)),
        }
    }

    fn from_project(project: Project, project_root: &Path, docs_override: Option<&Path>) -> Config {
        let docs_directory = match docs_override {
            Some(docs) => docs.to_owned(),
            None => project_root.join(project.docs_directory.0),
        };
        Config {
            new_items_directory: docs_directory.join(project.layout.new_items),
            global_index_path: docs_directory.join(project.layout.global_index),
            category_index_file: project.layout.category_index,
            tree_path: docs_directory.join(project.layout.tree),
            docs_directory,
            site_title: project.site_title.0,
            category_template: project
                .category_template
                .map(|relpath| project_root.join(relpath)),
            taxonomy: Taxonomy::with_overrides(project.taxonomy.lv1, project.taxonomy.lv2),
        }
    }

    /// The catalog file for a single category.
    pub fn category_index_path(&self, category: &str) -> PathBuf {
        self.docs_directory
            .join(category)
            .join(&self.category_index_file)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = Config::with_docs_directory(Path::new("docs"));
        assert_eq!(
            Path::new("docs/data/new_items"),
            config.new_items_directory.as_path()
        );
        assert_eq!(
            Path::new("docs/data/index.json"),
            config.global_index_path.as_path()
        );
        assert_eq!(
            Path::new("docs/tech/data/index.json"),
            config.category_index_path("tech").as_path()
        );
        assert_eq!(Path::new("docs/data/tree.json"), config.tree_path.as_path());
        assert_eq!(DEFAULT_SITE_TITLE, config.site_title);
        assert!(config.category_template.is_none());
    }

    #[test]
    fn test_from_directory_finds_project_file_in_ancestor() -> Result<()> {
        let root = tempfile::tempdir()?;
        std::fs::write(
            root.path().join(PROJECT_FILE_NAME),
            "docs_directory: site\n\
             site_title: My Notes\n\
             category_template: theme/category.html\n\
             layout:\n  tree: data/map.json\n\
             taxonomy:\n  lv1:\n    Home Lab: ''\n",
        )?;
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, None)?;
        assert_eq!(root.path().join("site"), config.docs_directory);
        assert_eq!(root.path().join("site/data/map.json"), config.tree_path);
        assert_eq!(
            root.path().join("site/data/index.json"),
            config.global_index_path
        );
        assert_eq!("My Notes", config.site_title);
        assert_eq!(
            Some(root.path().join("theme/category.html")),
            config.category_template
        );
        assert_eq!("home-lab", config.taxonomy.lv1(Some("Home Lab")).as_str());
        Ok(())
    }

    #[test]
    fn test_from_directory_without_project_file() -> Result<()> {
        let root = tempfile::tempdir()?;
        let config = Config::from_directory(root.path(), Some(Path::new("/srv/docs")))?;
        assert_eq!(Path::new("/srv/docs"), config.docs_directory.as_path());
        Ok(())
    }

    #[test]
    fn test_from_project_file_rejects_bad_yaml() -> Result<()> {
        let root = tempfile::tempdir()?;
        let path = root.path().join(PROJECT_FILE_NAME);
        std::fs::write(&path, "layout: [not, a, map]\n")?;
        assert!(Config::from_project_file(&path, None).is_err());
        Ok(())
    }
}
