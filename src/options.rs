//! Documentation options and the metadata resolver
//!
//! [`resolve`] fills every option the caller left unset with a default
//! derived from the [`CallSite`] and the [`TitleTable`]. Options the caller
//! supplied are never touched.

use serde::{Deserialize, Serialize};

use crate::call_site::{strip_test_suffix, CallSite, TEST_PREFIX};
use crate::{DocketError, Result};

/// One `(module, title)` pair of the title table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleEntry {
    /// Module name, compared with its test suffix stripped
    pub module: String,
    /// Group title used for that module
    pub title: String,
}

/// Ordered module-name to group-title table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleTable {
    entries: Vec<TitleEntry>,
}

impl TitleTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; earlier entries take precedence on lookup
    #[must_use]
    pub fn with(mut self, module: impl Into<String>, title: impl Into<String>) -> Self {
        self.entries.push(TitleEntry {
            module: module.into(),
            title: title.into(),
        });
        self
    }

    /// Title of the first entry matching `module`
    #[must_use]
    pub fn lookup(&self, module: &str) -> Option<&str> {
        let wanted = strip_test_suffix(module);
        self.entries
            .iter()
            .find(|entry| strip_test_suffix(&entry.module) == wanted)
            .map(|entry| entry.title.as_str())
    }

    /// Entries in table order
    #[must_use]
    pub fn entries(&self) -> &[TitleEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M, T> FromIterator<(M, T)> for TitleTable
where
    M: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (M, T)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (module, title)| table.with(module, title))
    }
}

/// Partially specified documentation options
///
/// `None` means "not given". `group_title` is doubly optional so a caller
/// can pin it to absent with [`DocOptions::without_group_title`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocOptions {
    /// Human readable description
    pub description: Option<String>,
    /// Group title
    pub group_title: Option<Option<String>>,
    /// Originating module
    pub module: Option<String>,
    /// Source file
    pub file: Option<String>,
    /// Source line
    pub line: Option<u32>,
}

impl DocOptions {
    /// Empty option set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the group title
    #[must_use]
    pub fn group_title(mut self, title: impl Into<String>) -> Self {
        self.group_title = Some(Some(title.into()));
        self
    }

    /// Pin the group title to absent, skipping the title table
    #[must_use]
    pub fn without_group_title(mut self) -> Self {
        self.group_title = Some(None);
        self
    }

    /// Set the module
    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Set the file
    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the line
    #[must_use]
    pub fn line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Whether every key is already set
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.description.is_some()
            && self.group_title.is_some()
            && self.module.is_some()
            && self.file.is_some()
            && self.line.is_some()
    }
}

/// A resolved description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Description {
    /// Supplied by the caller or derived from `test <name>`
    Text(String),
    /// Not supplied and the function name did not follow `test <name>`
    Undeterminable {
        /// Function found at the call site
        function: String,
    },
}

impl Description {
    /// Description text, failing if it could not be derived
    ///
    /// # Errors
    ///
    /// Returns [`DocketError::DescriptionUndeterminable`] for an undeterminable value
    pub fn text(&self) -> Result<&str> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Undeterminable { function } => Err(DocketError::DescriptionUndeterminable {
                function: function.clone(),
            }),
        }
    }

    /// Whether the description is usable
    #[must_use]
    pub fn is_determined(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Fully populated documentation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOptions {
    /// Description (may be undeterminable, see [`Description`])
    pub description: Description,
    /// Group title, absent when nothing matched
    pub group_title: Option<String>,
    /// Originating module
    pub module: String,
    /// Source file
    pub file: String,
    /// Source line
    pub line: u32,
}

impl ResolvedOptions {
    /// Description text
    ///
    /// # Errors
    ///
    /// Returns [`DocketError::DescriptionUndeterminable`] if no description
    /// was given and none could be derived
    pub fn description(&self) -> Result<&str> {
        self.description.text()
    }

    /// Fail now unless the description is usable
    ///
    /// # Errors
    ///
    /// Returns [`DocketError::DescriptionUndeterminable`] if no description
    /// was given and none could be derived
    pub fn require_description(self) -> Result<Self> {
        self.description.text()?;
        Ok(self)
    }

    /// Key used to group records: the group title, else the module
    #[must_use]
    pub fn group_key(&self) -> &str {
        self.group_title.as_deref().unwrap_or(&self.module)
    }

    /// Convert back into caller-side options
    ///
    /// An undeterminable description becomes unset.
    #[must_use]
    pub fn into_options(self) -> DocOptions {
        DocOptions {
            description: match self.description {
                Description::Text(text) => Some(text),
                Description::Undeterminable { .. } => None,
            },
            group_title: Some(self.group_title),
            module: Some(self.module),
            file: Some(self.file),
            line: Some(self.line),
        }
    }
}

/// Fill unset options with defaults from the call site and title table
///
/// Never fails: a description that cannot be derived is returned as
/// [`Description::Undeterminable`] and only errors when read.
#[must_use]
pub fn resolve(site: &CallSite, titles: &TitleTable, options: DocOptions) -> ResolvedOptions {
    let DocOptions {
        description,
        group_title,
        module,
        file,
        line,
    } = options;

    ResolvedOptions {
        description: description
            .map_or_else(|| default_description(&site.function), Description::Text),
        group_title: group_title
            .unwrap_or_else(|| titles.lookup(&site.module).map(str::to_string)),
        module: module.unwrap_or_else(|| site.module.clone()),
        file: file.unwrap_or_else(|| site.file.clone()),
        line: line.unwrap_or(site.line),
    }
}

fn default_description(function: &str) -> Description {
    match function.strip_prefix(TEST_PREFIX) {
        Some(name) => Description::Text(name.to_string()),
        None => Description::Undeterminable {
            function: function.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn widget_site() -> CallSite {
        CallSite::new("WidgetTest", "test lists all widgets", "test/widget_test.exs", 100)
    }

    fn widget_titles() -> TitleTable {
        TitleTable::new().with("Widget", "Widgets API")
    }

    #[test]
    fn test_resolve_all_defaults() {
        let resolved = resolve(&widget_site(), &widget_titles(), DocOptions::new());

        assert_eq!(
            resolved,
            ResolvedOptions {
                description: Description::Text("lists all widgets".to_string()),
                group_title: Some("Widgets API".to_string()),
                module: "WidgetTest".to_string(),
                file: "test/widget_test.exs".to_string(),
                line: 100,
            }
        );
    }

    #[test]
    fn test_resolve_keeps_caller_description() {
        let resolved = resolve(
            &widget_site(),
            &widget_titles(),
            DocOptions::new().description("custom"),
        );

        assert_eq!(resolved.description().unwrap(), "custom");
        assert_eq!(resolved.group_title.as_deref(), Some("Widgets API"));
        assert_eq!(resolved.module, "WidgetTest");
        assert_eq!(resolved.line, 100);
    }

    #[test]
    fn test_resolve_keeps_caller_line() {
        let resolved = resolve(&widget_site(), &widget_titles(), DocOptions::new().line(42));
        assert_eq!(resolved.line, 42);
    }

    #[test]
    fn test_undeterminable_description_is_lazy() {
        let site = CallSite::new("WidgetTest", "setup_widgets", "f.rs", 1);
        let resolved = resolve(&site, &widget_titles(), DocOptions::new());

        assert!(!resolved.description.is_determined());
        let err = resolved.description().unwrap_err();
        assert!(err.is_undeterminable_description());
        assert!(resolved.clone().require_description().is_err());
        assert_eq!(resolved.into_options().description, None);
    }

    #[test]
    fn test_empty_title_table() {
        let resolved = resolve(&widget_site(), &TitleTable::new(), DocOptions::new());
        assert_eq!(resolved.group_title, None);
        assert_eq!(resolved.group_key(), "WidgetTest");
    }

    #[test]
    fn test_first_matching_title_wins() {
        let titles = TitleTable::new()
            .with("Gadget", "Gadgets")
            .with("WidgetTest", "First")
            .with("Widget", "Second");

        assert_eq!(titles.lookup("WidgetTest"), Some("First"));
        assert_eq!(titles.lookup("Widget"), Some("First"));
        assert_eq!(titles.lookup("Sprocket"), None);
    }

    #[test]
    fn test_unit_test_module_matches_parent_title() {
        let site = CallSite::new("app::widget::tests", "test lists", "src/widget.rs", 12);
        let titles = TitleTable::new().with("app::widget", "Widgets API");

        let resolved = resolve(&site, &titles, DocOptions::new());
        assert_eq!(resolved.group_title.as_deref(), Some("Widgets API"));
        assert_eq!(resolved.module, "app::widget::tests");
    }

    #[test]
    fn test_pinned_absent_group_title() {
        let resolved = resolve(
            &widget_site(),
            &widget_titles(),
            DocOptions::new().without_group_title(),
        );
        assert_eq!(resolved.group_title, None);
    }

    #[test]
    fn test_title_table_from_iter() {
        let titles: TitleTable = [("api::widget", "Widgets"), ("api::gadget", "Gadgets")]
            .into_iter()
            .collect();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles.lookup("api::gadget_test"), Some("Gadgets"));
    }

    fn options_strategy() -> impl Strategy<Value = DocOptions> {
        (
            proptest::option::of("[a-z ]{0,12}"),
            proptest::option::of(proptest::option::of("[A-Z][a-z]{0,8}")),
            proptest::option::of("[A-Z][a-zA-Z]{0,10}"),
            proptest::option::of("[a-z/]{1,12}\\.rs"),
            proptest::option::of(0u32..10_000),
        )
            .prop_map(|(description, group_title, module, file, line)| DocOptions {
                description,
                group_title,
                module,
                file,
                line,
            })
    }

    proptest! {
        #[test]
        fn prop_complete_options_unchanged(
            description in "[a-z ]{0,12}",
            group_title in proptest::option::of("[A-Z][a-z]{0,8}"),
            module in "[A-Z][a-zA-Z]{0,10}",
            line in 0u32..10_000,
        ) {
            let mut options = DocOptions::new()
                .description(description)
                .module(module)
                .file("lib.rs")
                .line(line);
            options.group_title = Some(group_title);

            let resolved = resolve(&widget_site(), &widget_titles(), options.clone());
            prop_assert_eq!(resolved.into_options(), options);
        }

        #[test]
        fn prop_test_prefix_yields_description(name in "[a-zA-Z0-9 _]{0,24}") {
            let site = CallSite::new("M", format!("test {name}"), "f.rs", 1);
            let resolved = resolve(&site, &TitleTable::new(), DocOptions::new());
            prop_assert_eq!(resolved.description().unwrap(), name.as_str());
        }

        #[test]
        fn prop_without_prefix_is_undeterminable(function in "[a-z_][a-z0-9_]{0,16}") {
            prop_assume!(!function.starts_with(TEST_PREFIX));
            let site = CallSite::new("M", function, "f.rs", 1);
            let resolved = resolve(&site, &TitleTable::new(), DocOptions::new());
            prop_assert!(resolved.description().is_err());
        }

        #[test]
        fn prop_resolve_is_idempotent(options in options_strategy()) {
            let site = widget_site();
            let titles = widget_titles();
            let once = resolve(&site, &titles, options);
            let twice = resolve(&site, &titles, once.clone().into_options());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_matching_entry_sets_group_title(
            base in "[A-Z][a-z]{1,8}",
            title in "[A-Z][a-z ]{1,12}",
            suffix in prop_oneof![Just(""), Just("Test"), Just("Tests")],
        ) {
            prop_assume!(strip_test_suffix(&base) == base);
            let titles = TitleTable::new().with(base.clone(), title.clone());
            let site = CallSite::new(format!("{base}{suffix}"), "test x", "f.rs", 1);
            let resolved = resolve(&site, &titles, DocOptions::new());
            prop_assert_eq!(resolved.group_title, Some(title));
        }
    }
}
