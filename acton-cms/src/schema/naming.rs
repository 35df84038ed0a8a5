//! Name forms derived from a plural resource name
//!
//! Every synthesized artifact (tables, descriptors, routes, navigation)
//! reads its names from here so the conventions stay in one place.

use inflector::Inflector;

/// Naming conventions for module resources
pub struct Naming;

impl Naming {
    /// Singular form of the last dotted segment
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_cms::schema::Naming;
    /// assert_eq!(Naming::singular("events"), "event");
    /// assert_eq!(Naming::singular("categories"), "category");
    /// assert_eq!(Naming::singular("blog.posts"), "post");
    /// ```
    #[must_use]
    pub fn singular(name_plural: &str) -> String {
        Self::last_segment(name_plural).to_singular()
    }

    /// Pluralize a word
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_cms::schema::Naming;
    /// assert_eq!(Naming::pluralize("event"), "events");
    /// assert_eq!(Naming::pluralize("category"), "categories");
    /// ```
    #[must_use]
    pub fn pluralize(input: &str) -> String {
        input.to_plural()
    }

    /// Model type name: singular, `PascalCase`
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_cms::schema::Naming;
    /// assert_eq!(Naming::model_name("events"), "Event");
    /// assert_eq!(Naming::model_name("blog_posts"), "BlogPost");
    /// ```
    #[must_use]
    pub fn model_name(name_plural: &str) -> String {
        Self::singular(name_plural).to_pascal_case()
    }

    /// Human title used for navigation entries
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_cms::schema::Naming;
    /// assert_eq!(Naming::title("events"), "Events");
    /// assert_eq!(Naming::title("blog_posts"), "Blog Posts");
    /// ```
    #[must_use]
    pub fn title(name_plural: &str) -> String {
        Self::last_segment(name_plural).to_title_case()
    }

    /// Path form of a dotted slug (`blog.posts` → `blog/posts`)
    #[must_use]
    pub fn path_slug(name_plural: &str) -> String {
        name_plural.replace('.', "/")
    }

    /// Table-safe form of a dotted slug (`blog.posts` → `blog_posts`)
    #[must_use]
    pub fn table_name(name_plural: &str) -> String {
        name_plural.replace('.', "_")
    }

    /// Table-safe singular: the full dotted path with only the last word
    /// singularized
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_cms::schema::Naming;
    /// assert_eq!(Naming::table_singular("events"), "event");
    /// assert_eq!(Naming::table_singular("blog.posts"), "blog_post");
    /// ```
    #[must_use]
    pub fn table_singular(name_plural: &str) -> String {
        match name_plural.rsplit_once('.') {
            Some((prefix, last)) => {
                format!("{}_{}", Self::table_name(prefix), last.to_singular())
            }
            None => name_plural.to_singular(),
        }
    }

    /// Name of the translations table
    #[must_use]
    pub fn translations_table(name_plural: &str) -> String {
        format!("{}_translations", Self::table_singular(name_plural))
    }

    /// Name of the slugs table
    #[must_use]
    pub fn slugs_table(name_plural: &str) -> String {
        format!("{}_slugs", Self::table_singular(name_plural))
    }

    /// Name of the revisions table
    #[must_use]
    pub fn revisions_table(name_plural: &str) -> String {
        format!("{}_revisions", Self::table_singular(name_plural))
    }

    /// Foreign key column pointing back at the main table
    #[must_use]
    pub fn foreign_key(name_plural: &str) -> String {
        format!("{}_id", Self::table_singular(name_plural))
    }

    fn last_segment(name: &str) -> &str {
        name.rsplit('.').next().unwrap_or(name)
    }
}
