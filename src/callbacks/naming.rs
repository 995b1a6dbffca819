//! Diagnostic names for registered operations.
//!
//! Names only ever show up in fault reports. They never influence ordering
//! or outcome, and they never carry more than the last component of a
//! module path or file path.

use std::panic::Location;

/// Resolve the display name of an operation of type `F`.
///
/// An explicit name wins. Otherwise a named function item is labelled with
/// its bare function name, and anything else (closures, boxed callables)
/// falls back to `anonymous_function:<file>:<line>` of the registration site.
pub(crate) fn operation_name<F>(explicit: Option<&str>, site: &Location<'_>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }

    function_name(std::any::type_name::<F>())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "anonymous_function:{}:{}",
                file_name(site.file()),
                site.line()
            )
        })
}

fn function_name(type_name: &str) -> Option<&str> {
    let path = type_name.split('<').next().unwrap_or(type_name);
    if path.contains("{{closure}}") {
        return None;
    }

    let name = path.rsplit("::").next()?;
    let first = name.chars().next()?;
    // Function items are snake_case; struct paths like `Arc` are not names.
    (first.is_ascii_lowercase() || first == '_').then_some(name)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
