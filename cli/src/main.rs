#![allow(clippy::print_stderr)]
use crate::cli::{Args, Command};
use anyhow::{bail, Context};
use clap::Parser;
use spex_catalog::{collect_examples, write_catalog, CatalogOptions};
use spex_docs::{
    check_links, check_shell, extract_snippets, lint_markdown, placeholders, render,
    render_index, IndexOptions,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let matches = Args::parse();
    init_tracing(matches.verbose);
    match matches.command {
        Command::ToCsv {
            examples_dir,
            output,
            backend_id,
            prefix_id_in_title,
        } => {
            let options = CatalogOptions {
                backend_id,
                prefix_id_in_title,
            };
            let rows = collect_examples(&examples_dir, &options)?;
            let include_identifier = !options.prefix_id_in_title;
            if let Some(output) = output {
                let file = create_file(&output)?;
                close_file_writer(write_catalog(file, &rows, include_identifier)?)?;
            } else {
                write_catalog(stdout().lock(), &rows, include_identifier)?.flush()?;
            }
            Ok(())
        }
        Command::Index {
            site,
            examples_dir,
            title,
            output,
        } => {
            let options = IndexOptions {
                title,
                examples_dir,
                ..IndexOptions::default()
            };
            let page = render_index(&site, &options)?;
            if let Some(output) = output {
                let mut file = create_file(&output)?;
                file.write_all(page.as_bytes())?;
                close_file_writer(file)?;
            } else {
                let mut stdout = stdout().lock();
                stdout.write_all(page.as_bytes())?;
                stdout.flush()?;
            }
            Ok(())
        }
        Command::CheckLinks { page, site } => {
            let site = match site {
                Some(site) => site,
                None => page_directory(&page),
            };
            let report = check_links(&page, &site)?;
            for broken in &report.broken {
                eprintln!("{}:{}: {broken}", page.display(), broken.link.line);
            }
            tracing::info!(
                checked = report.checked,
                skipped = report.skipped,
                "Checked links of {}",
                page.display()
            );
            if !report.is_ok() {
                bail!(
                    "{} broken link(s) in {}",
                    report.broken.len(),
                    page.display()
                )
            }
            Ok(())
        }
        Command::Lint { files } => {
            let mut issues = 0;
            for file in &files {
                issues += lint_file(file)?;
            }
            if issues > 0 {
                bail!("{issues} issue(s) found")
            }
            Ok(())
        }
        Command::Recipes { file, values } => {
            let values = values.into_iter().collect::<BTreeMap<_, _>>();
            let markdown = read_file(&file)?;
            let mut stdout = stdout().lock();
            for snippet in extract_snippets(&markdown) {
                let commands = snippet.commands();
                let rendered = render(&commands, &values);
                writeln!(
                    stdout,
                    "## {} (line {})",
                    snippet.heading.as_deref().unwrap_or("(no heading)"),
                    snippet.line
                )?;
                let names = placeholders(&commands);
                if !names.is_empty() {
                    writeln!(stdout, "placeholders: {}", names.join(", "))?;
                }
                if !rendered.unresolved.is_empty() {
                    writeln!(stdout, "unresolved: {}", rendered.unresolved.join(", "))?;
                }
                writeln!(stdout, "{}\n", rendered.text.trim_end())?;
            }
            stdout.flush()?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reports the markdown and shell snippet issues of a file, returns their number.
fn lint_file(file: &Path) -> anyhow::Result<usize> {
    let markdown = read_file(file)?;
    let mut issues = 0;
    for issue in lint_markdown(&markdown) {
        eprintln!("{}:{}: {issue}", file.display(), issue.line);
        issues += 1;
    }
    for snippet in extract_snippets(&markdown) {
        for issue in check_shell(&snippet.commands()) {
            eprintln!(
                "{}:{}: {issue}",
                file.display(),
                snippet.line + issue.line - 1
            );
            issues += 1;
        }
    }
    tracing::debug!(issues, "Linted {}", file.display());
    Ok(issues)
}

fn page_directory(page: &Path) -> PathBuf {
    match page.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    }
}

fn read_file(file: &Path) -> anyhow::Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn create_file(file: &Path) -> anyhow::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(file).with_context(|| {
        format!("Failed to create {}", file.display())
    })?))
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}
