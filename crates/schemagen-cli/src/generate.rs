//! # Generate Subcommand
//!
//! `schemagen generate <SCHEMAS_DIR>` builds the Rust package for a schema
//! directory. Flags override the configuration file, which overrides the
//! built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use schemagen_codegen::{generate, GenerateOptions, Layout};

use crate::config::GenerateConfig;

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory containing `*.schema.json` files.
    pub schemas_dir: PathBuf,

    /// Root of the generated package [default: generated/rust].
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Name of the generated package [default: schemas].
    #[arg(long)]
    pub package_name: Option<String>,

    /// Version of the generated package [default: 0.1.0].
    #[arg(long)]
    pub package_version: Option<String>,

    /// Package layout: per-type or bundled [default: per-type].
    #[arg(long)]
    pub layout: Option<Layout>,

    /// Schema file name to skip. Repeatable.
    #[arg(long)]
    pub exclude: Vec<String>,
}

/// Merge flags over the configuration file.
pub fn resolve_options(args: &GenerateArgs, config: &GenerateConfig) -> Result<GenerateOptions> {
    let mut options = GenerateOptions::new(&args.schemas_dir);

    if let Some(output) = args.output.as_ref().or(config.output.as_ref()) {
        options = options.with_output_dir(output);
    }
    if let Some(name) = args.package_name.as_ref().or(config.package_name.as_ref()) {
        options = options.with_package_name(name);
    }
    if let Some(version) = args
        .package_version
        .as_ref()
        .or(config.package_version.as_ref())
    {
        options = options.with_package_version(version);
    }

    let layout = match (args.layout, config.layout.as_deref()) {
        (Some(layout), _) => Some(layout),
        (None, Some(name)) => Some(
            name.parse::<Layout>()
                .map_err(anyhow::Error::msg)
                .context("invalid layout in configuration file")?,
        ),
        (None, None) => None,
    };
    if let Some(layout) = layout {
        options = options.with_layout(layout);
    }

    let exclude = if args.exclude.is_empty() {
        &config.exclude
    } else {
        &args.exclude
    };
    for name in exclude {
        options = options.with_exclude(name);
    }

    Ok(options)
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = match config_path {
        Some(path) => GenerateConfig::load(path)?,
        None => GenerateConfig::default(),
    };
    let options = resolve_options(args, &config)?;
    tracing::debug!(?options, "resolved generation options");

    let report = generate(&options).with_context(|| {
        format!(
            "generating package from {}",
            options.schemas_dir.display()
        )
    })?;

    println!(
        "Generated {} type(s) into {} ({} layout, {} files)",
        report.type_names.len(),
        report.output_dir.display(),
        report.layout,
        report.files.len()
    );
    for name in &report.type_names {
        println!("  {name}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(schemas_dir: &Path) -> GenerateArgs {
        GenerateArgs {
            schemas_dir: schemas_dir.to_path_buf(),
            output: None,
            package_name: None,
            package_version: None,
            layout: None,
            exclude: Vec::new(),
        }
    }

    #[test]
    fn defaults_without_flags_or_config() {
        let options = resolve_options(&args(Path::new("schemas")), &GenerateConfig::default()).unwrap();
        assert_eq!(options, GenerateOptions::new("schemas"));
        assert_eq!(options.output_dir, PathBuf::from("generated/rust"));
        assert_eq!(options.package_name, "schemas");
        assert_eq!(options.package_version, "0.1.0");
        assert_eq!(options.layout, Layout::PerType);
    }

    #[test]
    fn flags_override_config() {
        let config = GenerateConfig {
            output: Some(PathBuf::from("from-config")),
            package_name: Some("config-name".into()),
            package_version: Some("9.9.9".into()),
            layout: Some("bundled".into()),
            exclude: vec!["a.schema.json".into()],
        };
        let mut flags = args(Path::new("schemas"));
        flags.package_name = Some("flag-name".into());
        flags.layout = Some(Layout::PerType);
        flags.exclude = vec!["b.schema.json".into()];

        let options = resolve_options(&flags, &config).unwrap();
        assert_eq!(options.output_dir, PathBuf::from("from-config"));
        assert_eq!(options.package_name, "flag-name");
        assert_eq!(options.package_version, "9.9.9");
        assert_eq!(options.layout, Layout::PerType);
        assert_eq!(options.exclude, ["b.schema.json"]);
    }

    #[test]
    fn bad_layout_in_config_is_an_error() {
        let config = GenerateConfig {
            layout: Some("flat".into()),
            ..GenerateConfig::default()
        };
        let err = resolve_options(&args(Path::new("schemas")), &config).unwrap_err();
        assert!(format!("{err:#}").contains("invalid layout"));
    }

    #[test]
    fn run_generate_writes_the_package() {
        let schemas = tempfile::tempdir().unwrap();
        fs::write(
            schemas.path().join("person.schema.json"),
            r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#,
        )
        .unwrap();
        let out = tempfile::tempdir().unwrap();
        let config_path = out.path().join("schemagen.yaml");
        fs::write(&config_path, "package_name: people\nlayout: bundled\n").unwrap();

        let mut flags = args(schemas.path());
        flags.output = Some(out.path().join("pkg"));
        let code = run_generate(&flags, Some(&config_path)).unwrap();
        assert_eq!(code, 0);
        assert!(out.path().join("pkg/src/parser.rs").is_file());
        let manifest = fs::read_to_string(out.path().join("pkg/Cargo.toml")).unwrap();
        assert!(manifest.contains("name = \"people\""));
    }

    #[test]
    fn run_generate_propagates_errors() {
        let schemas = tempfile::tempdir().unwrap();
        let err = run_generate(&args(schemas.path()), None).unwrap_err();
        assert!(format!("{err:#}").contains("no schema files found"));
    }
}
