use crate::core::{
    command_init::CommandInit,
    error::Result,
    file_status::{classify, FileStatus},
    ignore::{filter_repository_tree, read_directory, DirectoryNode, FsIgnoreSource},
    output::status_label,
    print_info,
    state::{AppState, WorkingState},
};
use colored::*;
use std::path::{Path, PathBuf};

/// Print the repository tree without ignored entries, each node tagged with its status.
/// With `cached`, print the tree persisted by the last run instead of reading the disk.
pub async fn execute_tree(repo_arg: Option<PathBuf>, cached: bool) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let root = ctx.repo.path();
    let mut state = ctx.cached_state();

    if cached {
        if state.files.is_empty() {
            print_info("No cached file list. Run `git-deck tree` first.");
        } else {
            print_tree(&state, root);
        }
        return Ok(());
    }

    let mut tree = read_directory(root)?;
    filter_repository_tree(&mut tree, root, &FsIgnoreSource);
    let working = ctx.sync.refresh(&ctx.repo, &state.working).await;
    state.set_files(tree);
    state.apply_working_state(working);

    print_tree(&state, root);

    if let Err(e) = ctx.cache.save_file_list(&ctx.repo, &state.files) {
        log::warn!("Cache save failed for file list: {e}");
    }
    ctx.store_working_state(&state.working);
    Ok(())
}

fn print_tree(state: &AppState, root: &Path) {
    println!();
    print_nodes(&state.files, root, &state.working, 0);
    println!();
}

fn print_nodes(nodes: &[DirectoryNode], root: &Path, working: &WorkingState, depth: usize) {
    for node in nodes {
        let status = classify(node, root, working);
        let name = node.display_name();
        let name = if node.is_dir() {
            format!("{name}/").blue()
        } else if status == FileStatus::Unchanged {
            name.white()
        } else {
            name.bold()
        };
        println!("{} {}{}", status_label(status), "  ".repeat(depth), name);

        if let Some(children) = &node.children {
            print_nodes(children, root, working, depth + 1);
        }
    }
}
