//! SVG icons embedded into a Jinja template fragment.
//!
//! The generated fragment declares an `icons` dictionary holding the raw SVG
//! markup of every icon, followed by two macros which look an icon up by its
//! symbolic name:
//!
//! ```jinja
//! {{ icon('search-outline', 'Search') }}
//! {{ icon_small('close-outline') }}
//! ```
//!
//! Both macros render nothing for names missing from the dictionary.

use std::fmt::Write;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::actions::concat::write;
use crate::error::TaskError;
use crate::task::IconOptions;

const MACROS: &str = r#"{% macro icon(action, alt) -%}
{%- if action in icons -%}
<span class="ion-icon-big ion-{{ action }}" title="{{ alt }}">{{ icons[action] | safe }}</span>
{%- endif -%}
{%- endmacro -%}

{% macro icon_small(action) -%}
{%- if action in icons -%}
<span class="ion-icon ion-{{ action }}" title="{{ action }}">{{ icons[action] | safe }}</span>
{%- endif -%}
{%- endmacro -%}
"#;

/// An icon whose source file was read successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
    pub svg: String,
}

/// Result of loading an icon set.
#[derive(Debug, Default)]
pub struct IconSet {
    /// Loaded icons, in declaration order.
    pub icons: Vec<Icon>,
    /// Names of icons whose file couldn't be read.
    pub skipped: Vec<String>,
}

/// Reads every icon file. Unreadable files are logged and skipped, the rest
/// keep the order in which they were declared.
pub fn load(root: &Utf8Path, entries: &[(String, Utf8PathBuf)]) -> IconSet {
    let results: Vec<_> = entries
        .par_iter()
        .map(|(name, path)| {
            let path = root.join(path);
            let data = fs::read_to_string(&path);
            (name, path, data)
        })
        .collect();

    let mut set = IconSet::default();

    for (name, path, data) in results {
        match data {
            Ok(svg) => set.icons.push(Icon {
                name: name.clone(),
                svg,
            }),
            Err(err) => {
                tracing::error!("icon '{}': couldn't read {}: {}", name, path, err);
                set.skipped.push(name.clone());
            }
        }
    }

    set
}

/// Escapes `text` for use inside a single-quoted Jinja string literal.
pub fn escape_literal(text: &str) -> String {
    let mut buffer = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' => buffer.push_str("\\\\"),
            '\'' => buffer.push_str("\\'"),
            '"' => buffer.push_str("\\\""),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            '\t' => buffer.push_str("\\t"),
            c => buffer.push(c),
        }
    }

    buffer
}

/// Renders the template fragment for `icons`.
pub fn render(icons: &[Icon]) -> String {
    let mut buffer = String::from("{%- set icons = {\n");

    for (i, icon) in icons.iter().enumerate() {
        let sep = if i + 1 < icons.len() { "," } else { "" };
        let _ = writeln!(
            buffer,
            "  '{}':'{}'{}",
            escape_literal(&icon.name),
            escape_literal(&icon.svg),
            sep
        );
    }

    buffer.push_str("} -%}\n\n");
    buffer.push_str(MACROS);
    buffer
}

/// Runs the icon transform, returning the path of the written fragment.
pub(crate) fn run(root: &Utf8Path, opts: &IconOptions) -> Result<(IconSet, Utf8PathBuf), TaskError> {
    let set = load(root, &opts.icons);
    let fragment = render(&set.icons);

    #[cfg(feature = "minijinja")]
    validate(&fragment)?;

    let output = root.join(&opts.output);
    write(&output, fragment.as_bytes())?;

    tracing::debug!("embedded {} icon(s) into {}", set.icons.len(), output);
    Ok((set, output))
}

#[cfg(feature = "minijinja")]
fn validate(fragment: &str) -> Result<(), TaskError> {
    let env = minijinja::Environment::new();
    env.template_from_str(fragment)
        .map(|_| ())
        .map_err(|err| TaskError::Template(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::{Environment, context};

    fn icon(name: &str, svg: &str) -> Icon {
        Icon {
            name: name.into(),
            svg: svg.into(),
        }
    }

    /// Renders `fragment` followed by `tail` as a single template.
    fn eval(fragment: &str, tail: &str) -> String {
        let source = format!("{fragment}{tail}");
        let env = Environment::new();
        env.render_str(&source, context! {}).unwrap()
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal(r#"a"b\c'd"#), r#"a\"b\\c\'d"#);
        assert_eq!(escape_literal("line\r\nnext\tx"), "line\\r\\nnext\\tx");
        assert_eq!(escape_literal("<svg/>"), "<svg/>");
    }

    #[test]
    fn test_render_keeps_order() {
        let fragment = render(&[icon("c", "<c/>"), icon("a", "<a/>"), icon("b", "<b/>")]);

        let c = fragment.find("'c'").unwrap();
        let a = fragment.find("'a'").unwrap();
        let b = fragment.find("'b'").unwrap();
        assert!(c < a && a < b);
    }

    #[test]
    fn test_render_is_stable() {
        let icons = [icon("menu", "<svg>\n</svg>"), icon("globe", "<svg/>")];
        assert_eq!(render(&icons), render(&icons));
    }

    #[test]
    fn test_escaping_round_trip() {
        let svg = "<svg title=\"x\">a\\b\nc'd\r\n\t</svg>";
        let fragment = render(&[icon("tricky", svg)]);

        assert_eq!(eval(&fragment, "{{ icons['tricky'] }}"), svg);
    }

    #[test]
    fn test_macros_render_markup() {
        let fragment = render(&[icon("menu", "<svg><path/></svg>")]);

        assert_eq!(
            eval(&fragment, "{{ icon('menu', 'Menu') }}"),
            r#"<span class="ion-icon-big ion-menu" title="Menu"><svg><path/></svg></span>"#
        );
        assert_eq!(
            eval(&fragment, "{{ icon_small('menu') }}"),
            r#"<span class="ion-icon ion-menu" title="menu"><svg><path/></svg></span>"#
        );
    }

    #[test]
    fn test_empty_set_is_well_formed() {
        let fragment = render(&[]);

        assert_eq!(eval(&fragment, "{{ icon('menu', 'Menu') }}"), "");
        assert_eq!(eval(&fragment, "{{ icon_small('menu') }}"), "");
    }

    #[test]
    fn test_unknown_name_renders_nothing() {
        let fragment = render(&[icon("menu", "<svg/>")]);
        assert_eq!(eval(&fragment, "[{{ icon('nope', 'x') }}]"), "[]");
    }

    #[test]
    fn test_load_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("a.svg"), "<a/>").unwrap();
        fs::write(root.join("c.svg"), "<c/>").unwrap();

        let entries = vec![
            ("a".to_string(), Utf8PathBuf::from("a.svg")),
            ("b".to_string(), Utf8PathBuf::from("missing.svg")),
            ("c".to_string(), Utf8PathBuf::from("c.svg")),
        ];

        let set = load(&root, &entries);

        assert_eq!(set.icons, vec![icon("a", "<a/>"), icon("c", "<c/>")]);
        assert_eq!(set.skipped, vec!["b".to_string()]);
    }
}
