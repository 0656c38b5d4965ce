//! Call-site identifiers captured where a doc helper is invoked

use serde::{Deserialize, Serialize};

/// Prefix marking a function name as a test in the `test <name>` convention
pub const TEST_PREFIX: &str = "test ";

/// Suffixes removed from module names before comparing them, longest first
///
/// `::tests` covers the `#[cfg(test)] mod tests` inside the module under test.
pub const TEST_SUFFIXES: [&str; 6] = ["::tests", "_tests", "Tests", "::test", "_test", "Test"];

/// Where a doc helper was called from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Enclosing module (e.g. `api::widget_test` or `WidgetTest`)
    pub module: String,
    /// Enclosing function, ideally `test <name>`
    pub function: String,
    /// Source file
    pub file: String,
    /// Source line
    pub line: u32,
}

impl CallSite {
    /// Create a call site from explicit identifiers
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Create a call site from the type path of an item nested in the
    /// enclosing function (see [`call_site!`](crate::call_site))
    #[must_use]
    pub fn from_item_path(module: &str, item_path: &str, file: &str, line: u32) -> Self {
        Self::new(module, function_from_item_path(item_path), file, line)
    }
}

/// Type name of a value, used by `call_site!` to find the enclosing function
#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Extract the enclosing function from `a::b::enclosing::{{closure}}::marker`
///
/// `test_lists_widgets` becomes `test lists widgets`; other identifiers are
/// returned as-is.
fn function_from_item_path(item_path: &str) -> String {
    let ident = item_path
        .rsplit("::")
        .skip(1)
        .find(|segment| !segment.starts_with('{'))
        .unwrap_or(item_path);

    match ident.strip_prefix("test_") {
        Some(rest) if !rest.is_empty() => format!("{TEST_PREFIX}{}", rest.replace('_', " ")),
        _ => ident.to_string(),
    }
}

/// Remove one test suffix from a module or controller name
#[must_use]
pub fn strip_test_suffix(name: &str) -> &str {
    TEST_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// Capture the current [`CallSite`]
///
/// With no argument the function name is taken from the enclosing fn; a
/// string argument overrides it.
///
/// ```
/// let site = docket::call_site!("test lists all widgets");
/// assert_eq!(site.function, "test lists all widgets");
/// assert_eq!(site.file, file!());
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __docket_marker() {}
        $crate::CallSite::from_item_path(
            module_path!(),
            $crate::call_site::type_name_of(__docket_marker),
            file!(),
            line!(),
        )
    }};
    ($function:expr) => {
        $crate::CallSite::new(module_path!(), $function, file!(), line!())
    };
}
