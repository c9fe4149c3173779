//! Allow-list source file: template expansion, writing, and parsing back.

#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use crate::core::errors::{Result, SpaError};
use crate::core::options::Options;

/// Text template for the list file.
///
/// `header` and `footer` may use `{build_tags}`, `{package}` and `{variable}`;
/// `entry` is expanded once per path and may also use `{entry}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTemplate {
    pub header: String,
    pub entry: String,
    pub footer: String,
}

impl Default for ListTemplate {
    fn default() -> Self {
        Self {
            header: "// Code generated by spa-assets. DO NOT EDIT.\n\
                     \n\
                     // +build {build_tags}\n\
                     \n\
                     package {package}\n\
                     \n\
                     func init() {\n\
                     \t{variable}.IncludeList = append({variable}.IncludeList,\n"
                .to_string(),
            entry: "\t\t\"{entry}\",\n".to_string(),
            footer: "\t)\n}\n".to_string(),
        }
    }
}

impl ListTemplate {
    /// Expand the template for `list` using the list-file fields of `options`.
    #[must_use]
    pub fn render(&self, list: &[String], options: &Options) -> String {
        let fields = |text: &str| {
            text.replace("{build_tags}", &options.list_file_build_tags)
                .replace("{package}", &options.package_name)
                .replace("{variable}", &options.variable_name)
        };
        let mut out = fields(&self.header);
        let entry = fields(&self.entry);
        for path in list {
            out.push_str(&entry.replace("{entry}", path));
        }
        out.push_str(&fields(&self.footer));
        out
    }
}

/// Render `list` and write it to `path`, creating or truncating the file.
pub fn write_list_file(
    path: &Path,
    list: &[String],
    options: &Options,
    template: &ListTemplate,
) -> Result<()> {
    let contents = template.render(list, options);
    fs::write(path, contents).map_err(|source| SpaError::io(path, source))
}

/// Extract the quoted entries from a list file, in file order.
///
/// Only lines consisting of a single quoted string followed by an optional
/// comma count as entries, so the header and footer are skipped.
#[must_use]
pub fn parse_list_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let line = line.strip_suffix(',').unwrap_or(line);
            let inner = line.strip_prefix('"')?.strip_suffix('"')?;
            (!inner.contains('"')).then(|| inner.to_string())
        })
        .collect()
}
