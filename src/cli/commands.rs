//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::query::answer;
use crate::cli::args::{Cli, Commands, ConfigCommands, InputArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{PartTree, Query, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = project_dir(cli)?;
    let settings = Settings::load(Some(&project_dir))?;
    let container = ServiceContainer::new(settings, &project_dir);

    match &cli.command {
        Some(Commands::Run { input, queries }) => _run(&container, input, queries.as_deref()),
        Some(Commands::Query { input, queries }) => _query(&container, input, queries.as_deref()),
        Some(Commands::Whatis { name, input }) => {
            let query = Query::WhatIs { name: name.clone() };
            _single(&container, input, &query)
        }
        Some(Commands::Howmany { parent, child, input }) => {
            let query = Query::HowMany {
                parent: parent.clone(),
                child: child.clone(),
            };
            _single(&container, input, &query)
        }
        Some(Commands::Report { input, listing }) => _report(&container, input, *listing),
        Some(Commands::Tree { input }) => _tree(&container, input),
        Some(Commands::Verify { input }) => _verify(&container, input),
        Some(Commands::Config { command }) => _config(&container, command, &project_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "project directory does not exist: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.clone()),
        None => Ok(PathBuf::from(".")),
    }
}

fn load(container: &ServiceContainer, input: &InputArgs) -> CliResult<PartTree> {
    Ok(container.load_tree(input.definitions.as_deref())?)
}

#[instrument(skip(container))]
fn _run(container: &ServiceContainer, input: &InputArgs, queries: Option<&Path>) -> CliResult<()> {
    let tree = load(container, input)?;
    output::raw(&container.run_queries(&tree, queries)?);
    output::info(&container.settings.separator);
    tree.visit(|visit| {
        output::info(&format!(
            "component name:{} count: {}",
            visit.part.name, visit.part.quantity
        ))
    });

    let verification = container.verifier.verify(&tree);
    if verification.is_deep() {
        output::info("this is deep copy. validating if the contents of them are the same.");
    }
    verification.ensure()?;
    output::success("deep copy succeeded.");

    let removed = tree.clear();
    debug!("cleared source tree: {:?}", removed);
    Ok(())
}

#[instrument(skip(container))]
fn _query(container: &ServiceContainer, input: &InputArgs, queries: Option<&Path>) -> CliResult<()> {
    let tree = load(container, input)?;
    output::raw(&container.run_queries(&tree, queries)?);
    Ok(())
}

#[instrument(skip(container))]
fn _single(container: &ServiceContainer, input: &InputArgs, query: &Query) -> CliResult<()> {
    let tree = load(container, input)?;
    let text = answer(&tree, query);
    if text.is_empty() {
        output::warning(&"part not found");
    }
    output::raw(&text);
    Ok(())
}

#[instrument(skip(container))]
fn _report(container: &ServiceContainer, input: &InputArgs, listing: bool) -> CliResult<()> {
    let tree = load(container, input)?;
    if listing {
        output::raw(&tree.full_listing());
    } else {
        output::raw(&tree.full_report());
    }
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, input: &InputArgs) -> CliResult<()> {
    let tree = load(container, input)?;
    output::header(&format!("{} parts, depth {}", tree.len(), tree.depth()));
    output::raw(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn _verify(container: &ServiceContainer, input: &InputArgs) -> CliResult<()> {
    let tree = load(container, input)?;
    let verification = container.verifier.verify(&tree);

    output::header("Copy verification");
    let checks = [
        (verification.alias_shares_nodes, "alias shares every node with the source"),
        (verification.is_deep(), "deep clone shares no node with the source"),
        (verification.content_matches(), "deep clone content matches the source"),
    ];
    for (ok, label) in checks {
        if ok {
            output::detail(&format!("✓ {}", label));
        } else {
            output::failure(&label);
        }
    }
    let verification = verification.ensure()?;
    output::success(&format!("{} nodes verified", verification.source_nodes));
    Ok(())
}

fn _config(container: &ServiceContainer, command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::raw(&container.settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning(&"no global config directory"),
            }
            output::action("local", &local_config_path(project_dir).display());
        }
    }
    Ok(())
}
