use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use console::style;
use themekit::{
    Adapters, Blueprint, Bundle, CommandLinter, ConcatOptions, CopyOptions, Esbuild, IconOptions,
    Lessc, LintOptions, LintTool, MinifyOptions, Pipeline, StyleOptions, Task,
};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    /// Run the full `default` sequence once.
    Build,
    /// Run the linters only.
    Test,
    /// Build, then rebuild whenever a source file changes.
    Watch,
}

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
    #[clap(value_enum, index = 1, default_value = "build")]
    mode: Mode,

    /// Theme directory, every path of the pipeline is relative to it.
    #[clap(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Fail the run when a linter reports errors.
    #[clap(long)]
    fail_on_lint: bool,
}

const ICONS: &[(&str, &str)] = &[
    ("error", "alert-circle"),
    ("warning", "alert-circle-outline"),
    ("close-outline", "close-outline"),
    ("chevron-up", "chevron-up-outline"),
    ("menu", "menu-outline"),
    ("ellipsis-vertical", "ellipsis-vertical-outline"),
    ("magnet", "magnet-outline"),
    ("globe", "globe-outline"),
    ("search-outline", "search-outline"),
    ("image", "image-outline"),
    ("play", "play-outline"),
    ("newspaper", "newspaper-outline"),
    ("location", "location-outline"),
    ("musical-notes", "musical-notes-outline"),
    ("layers", "layers-outline"),
    ("school", "school-outline"),
    ("file-tray-full", "file-tray-full-outline"),
    ("people", "people-outline"),
];

/// Tasks of the `default` sequence, in execution order.
const DEFAULT: &[&str] = &[
    "eslint",
    "stylelint",
    "copy-js",
    "copy-css",
    "copy-images",
    "concat",
    "svg2jinja",
    "uglify",
    "less-development",
    "less-production",
];

/// Tasks rerun on source changes. Style linting and the icon template are
/// left to full builds.
const WATCH: &[&str] = &[
    "eslint",
    "copy-js",
    "copy-css",
    "copy-images",
    "concat",
    "uglify",
    "less-development",
    "less-production",
];

fn vendor(name: &'static str, dest: &str, pattern: &str) -> Task {
    Task::copy(
        name,
        CopyOptions {
            cwd: "node_modules".into(),
            patterns: vec![pattern.into()],
            dest: dest.into(),
            flatten: true,
            preserve_timestamps: true,
        },
    )
}

fn simple_theme(args: &Args) -> anyhow::Result<Pipeline> {
    let mut config = Blueprint::new(args.root.clone());

    config.set_adapters(Adapters {
        compiler: Arc::new(Lessc),
        script_linter: Arc::new(CommandLinter::eslint()),
        style_linter: Arc::new(CommandLinter::stylelint()),
        minifier: Arc::new(Esbuild),
    });

    config
        .register(Task::lint(
            "eslint",
            LintOptions {
                tool: LintTool::Script,
                patterns: vec![
                    "src/js/main/*.js".into(),
                    "src/js/head/*.js".into(),
                    "../__common__/js/*.js".into(),
                ],
                fail_on_error: args.fail_on_lint,
            },
        ))?
        .register(Task::lint(
            "stylelint",
            LintOptions {
                tool: LintTool::Style,
                patterns: vec!["src/less/**/*.less".into()],
                fail_on_error: args.fail_on_lint,
            },
        ))?
        .register(vendor("copy-js", "js", "leaflet/dist/leaflet.js"))?
        .register(vendor("copy-css", "css", "leaflet/dist/leaflet.css"))?
        .register(vendor("copy-images", "css/images", "leaflet/dist/images/*.png"))?
        .register(Task::concat(
            "concat",
            ConcatOptions {
                separator: ";".into(),
                bundles: vec![
                    Bundle {
                        output: "js/searxng.head.js".into(),
                        inputs: vec!["src/js/head/*.js".into()],
                    },
                    Bundle {
                        output: "js/searxng.js".into(),
                        inputs: vec![
                            "src/js/main/*.js".into(),
                            "../__common__/js/*.js".into(),
                            "node_modules/autocomplete-js/dist/autocomplete.js".into(),
                        ],
                    },
                ],
            },
        ))?;

    let icons = ICONS.iter().fold(
        IconOptions::new("../../../templates/simple/icons.html"),
        |opts, (name, file)| opts.icon(*name, format!("node_modules/ionicons/dist/svg/{file}.svg")),
    );

    config
        .register(Task::icons("svg2jinja", icons))?
        .register(
            Task::minify_script(
                "uglify",
                MinifyOptions {
                    files: vec![
                        ("js/searxng.head.min.js".into(), "js/searxng.head.js".into()),
                        ("js/searxng.min.js".into(), "js/searxng.js".into()),
                    ],
                    mangle: true,
                    source_map: true,
                    keep_comments: true,
                },
            )
            .after("concat"),
        )?
        .register(Task::compile_style(
            "less-development",
            StyleOptions {
                files: vec![
                    ("css/searxng.css".into(), "src/less/style.less".into()),
                    ("css/searxng-rtl.css".into(), "src/less/style-rtl.less".into()),
                ],
                load_paths: vec!["less".into()],
                minify: false,
                source_map: false,
            },
        ))?
        .register(Task::compile_style(
            "less-production",
            StyleOptions {
                files: vec![
                    ("css/searxng.min.css".into(), "src/less/style.less".into()),
                    ("css/searxng-rtl.min.css".into(), "src/less/style-rtl.less".into()),
                ],
                load_paths: vec!["less".into()],
                minify: true,
                source_map: true,
            },
        ))?;

    config
        .sequence("default", DEFAULT.iter().copied())?
        .sequence("test", ["eslint"])?
        .sequence("watch", WATCH.iter().copied())?;

    tracing::debug!("task graph:\n{}", config);

    Ok(config.finish()?)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    themekit::init_logging()?;

    eprintln!(
        "{} {} {}",
        style("themekit").bold().cyan(),
        style(env!("CARGO_PKG_VERSION")).dim(),
        style(&args.root).green()
    );

    let pipeline = simple_theme(&args)?;

    let sequence = match args.mode {
        Mode::Build => "default",
        Mode::Test => "test",
        Mode::Watch => {
            pipeline.watch("watch", &["src/**"])?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    match pipeline.run(sequence) {
        Ok(diagnostics) => {
            eprintln!("{diagnostics}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("{} {}", style("failed:").red().bold(), err);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(fail_on_lint: bool) -> Args {
        Args {
            mode: Mode::Build,
            root: "searx/static/themes/simple".into(),
            fail_on_lint,
        }
    }

    #[test]
    fn test_sequences() {
        let pipeline = simple_theme(&args(false)).unwrap();

        assert_eq!(pipeline.sequence("default").unwrap(), DEFAULT);
        assert_eq!(pipeline.sequence("test").unwrap(), ["eslint"]);
        assert_eq!(
            pipeline.sequence("watch").unwrap(),
            [
                "eslint",
                "copy-js",
                "copy-css",
                "copy-images",
                "concat",
                "uglify",
                "less-development",
                "less-production"
            ]
        );
    }

    #[test]
    fn test_lint_policy_follows_flag() {
        let pipeline = simple_theme(&args(false)).unwrap();
        assert!(pipeline.task("eslint").unwrap().tolerates_failure());

        let pipeline = simple_theme(&args(true)).unwrap();
        assert!(!pipeline.task("stylelint").unwrap().tolerates_failure());
    }
}
