mod common;
use common::fixtures::*;
use common::repository::*;
use git_deck::core::outcome::NOT_A_REPOSITORY_MESSAGE;
use git_deck::{
    CommitOutcome, CommitScope, GitBridge, MutationGate, PullOutcome, RepositoryHandle,
    Synchronizer, WorkingState,
};
use std::fs;
use tempfile::TempDir;

fn synchronizer() -> Synchronizer {
    Synchronizer::new(GitBridge::new(), MutationGate::new(true))
}

fn paths(entries: &[git_deck::FileStatusEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.path.as_str()).collect()
}

#[cfg(test)]
mod bridge_tests {
    use super::*;

    #[tokio::test]
    async fn test_check_repository_on_plain_folder() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let bridge = GitBridge::new();

        let check = bridge
            .check_repository(&RepositoryHandle::new(temp_dir.path()))
            .await?;

        assert!(!check.is_repository);
        assert_eq!(check.error_message.as_deref(), Some(NOT_A_REPOSITORY_MESSAGE));
        Ok(())
    }

    #[tokio::test]
    async fn test_check_repository_on_fresh_repo() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let check = GitBridge::new().check_repository(&repo.handle()).await?;
        assert!(check.is_repository);
        assert!(check.error_message.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_clean_repo_has_empty_lists() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let bridge = GitBridge::new();

        assert!(bridge.list_changed_files(&repo.handle()).await?.is_empty());
        assert!(bridge.list_staged_files(&repo.handle()).await?.is_empty());
        assert!(bridge.list_untracked_files(&repo.handle()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_changed_and_untracked_are_listed_separately() -> anyhow::Result<()> {
        let repo = create_modified_repo()?;
        let bridge = GitBridge::new();

        let changed = bridge.list_changed_files(&repo.handle()).await?;
        let untracked = bridge.list_untracked_files(&repo.handle()).await?;

        assert_eq!(paths(&changed), vec!["src/a.txt"]);
        assert_eq!(changed[0].name, "a.txt");
        assert_eq!(paths(&untracked), vec!["notes.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_stage_file_moves_it_to_staged_view() -> anyhow::Result<()> {
        let repo = create_modified_repo()?;
        let sync = synchronizer();
        let prior = sync.refresh(&repo.handle(), &WorkingState::default()).await;
        assert_eq!(paths(&prior.changed), vec!["src/a.txt", "notes.txt"]);

        let working = sync.stage_file(&repo.handle(), &prior, "src/a.txt").await?;

        assert_eq!(paths(&working.staged), vec!["src/a.txt"]);
        assert_eq!(paths(&working.changed), vec!["notes.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_stage_all_then_unstage_all() -> anyhow::Result<()> {
        let repo = create_modified_repo()?;
        let sync = synchronizer();

        let staged = sync.stage_all(&repo.handle(), &WorkingState::default()).await?;
        assert!(staged.changed.is_empty());
        assert_eq!(staged.staged.len(), 2);

        let unstaged = sync.unstage_all(&repo.handle(), &staged).await?;
        assert!(unstaged.staged.is_empty());
        assert_eq!(paths(&unstaged.changed), vec!["src/a.txt", "notes.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_revert_staged_file_restores_content() -> anyhow::Result<()> {
        let repo = create_modified_repo()?;
        let sync = synchronizer();
        let staged = sync
            .stage_file(&repo.handle(), &WorkingState::default(), "src/a.txt")
            .await?;

        let working = sync.revert_file(&repo.handle(), &staged, "src/a.txt").await?;

        assert_eq!(fs::read_to_string(repo.path().join("src/a.txt"))?, "a\n");
        assert!(working.staged.is_empty());
        assert_eq!(paths(&working.changed), vec!["notes.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_revert_untracked_file_deletes_it() -> anyhow::Result<()> {
        let repo = create_modified_repo()?;
        let sync = synchronizer();
        let prior = sync.refresh(&repo.handle(), &WorkingState::default()).await;

        let working = sync.revert_file(&repo.handle(), &prior, "notes.txt").await?;

        assert!(!repo.path().join("notes.txt").exists());
        assert_eq!(paths(&working.changed), vec!["src/a.txt"]);
        assert_eq!(fs::read_to_string(repo.path().join("src/a.txt"))?, "a changed\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_revert_newly_staged_file_deletes_it() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(repo.path(), "draft.txt", "draft\n")?;
        let sync = synchronizer();
        let staged = sync
            .stage_file(&repo.handle(), &WorkingState::default(), "draft.txt")
            .await?;
        assert_eq!(paths(&staged.staged), vec!["draft.txt"]);

        let working = sync.revert_file(&repo.handle(), &staged, "draft.txt").await?;

        assert!(!repo.path().join("draft.txt").exists());
        assert!(working.is_clean());
        Ok(())
    }

    #[tokio::test]
    async fn test_non_ascii_names_are_listed_verbatim() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(repo.path(), "café.txt", "bonjour\n")?;
        let sync = synchronizer();

        let untracked = GitBridge::new().list_untracked_files(&repo.handle()).await?;
        assert_eq!(paths(&untracked), vec!["café.txt"]);

        let working = sync
            .stage_file(&repo.handle(), &WorkingState::default(), "café.txt")
            .await?;
        assert_eq!(paths(&working.staged), vec!["café.txt"]);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_name_does_not_break_listing() -> anyhow::Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let repo = setup_test_repo_with_initial_commit()?;
        create_file(repo.path(), "ok.txt", "ok\n")?;
        fs::write(repo.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "latin-1\n")?;

        let untracked = GitBridge::new().list_untracked_files(&repo.handle()).await?;

        assert_eq!(paths(&untracked), vec!["caf\u{FFFD}.txt", "ok.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_revert_all_removes_untracked_and_restores_tracked() -> anyhow::Result<()> {
        let repo = create_modified_repo()?;
        let sync = synchronizer();

        let working = sync
            .revert_all(&repo.handle(), &WorkingState::default())
            .await?;

        assert!(working.is_clean());
        assert!(!repo.path().join("notes.txt").exists());
        assert_eq!(fs::read_to_string(repo.path().join("src/a.txt"))?, "a\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_on_clean_repo_is_nothing_to_commit() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let report = synchronizer()
            .commit(&repo.handle(), &WorkingState::default(), "test", None)
            .await?;
        assert_eq!(report.outcome, CommitOutcome::NothingToCommit);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_with_unstaged_edits_is_no_changes() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(repo.path(), "initial.txt", "edited\n")?;

        let report = synchronizer()
            .commit(&repo.handle(), &WorkingState::default(), "test", None)
            .await?;

        assert_eq!(report.outcome, CommitOutcome::NoChanges);
        assert_eq!(paths(&report.working.changed), vec!["initial.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_staged_change() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(repo.path(), "feature.txt", "new\n")?;
        let sync = synchronizer();
        let staged = sync
            .stage_file(&repo.handle(), &WorkingState::default(), "feature.txt")
            .await?;

        let report = sync
            .commit(&repo.handle(), &staged, "Add feature", None)
            .await?;

        assert!(report.outcome.clears_draft());
        assert!(report.working.is_clean());
        assert_eq!(
            sync.bridge().last_commit_message(&repo.handle()).await?,
            "Add feature"
        );
        assert_eq!(sync.bridge().commit_count(&repo.handle()).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unpushed_log_keeps_delimiter_in_message() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let _remote = add_origin(&repo)?;
        create_file(repo.path(), "next.txt", "next\n")?;
        git_add(repo.path(), "next.txt")?;
        git_commit(repo.path(), "Split a $|$ b")?;
        let bridge = GitBridge::new();

        let unpushed = bridge
            .get_commit_log(&repo.handle(), CommitScope::LocalUnpushed, "main")
            .await?;

        assert_eq!(unpushed.len(), 1);
        assert_eq!(unpushed[0].author, "Test User");
        assert_eq!(unpushed[0].message, "Split a $|$ b");
        assert!(unpushed[0].timestamp.ends_with('Z'));

        let local_hash = bridge.get_latest_local_commit_hash(&repo.handle()).await?;
        assert_eq!(local_hash.as_deref(), Some(unpushed[0].hash.as_str()));

        let remote = bridge
            .get_commit_log(&repo.handle(), CommitScope::Remote, "main")
            .await?;
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].message, "Initial commit");
        Ok(())
    }

    #[tokio::test]
    async fn test_unpushed_log_without_upstream_is_empty() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let commits = GitBridge::new()
            .get_commit_log(&repo.handle(), CommitScope::LocalUnpushed, "main")
            .await?;
        assert!(commits.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_push_updates_remote_head_and_unpushed() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let _remote = add_origin(&repo)?;
        create_file(repo.path(), "next.txt", "next\n")?;
        git_add(repo.path(), "next.txt")?;
        git_commit(repo.path(), "Next")?;
        let sync = synchronizer();
        let local_hash = sync
            .bridge()
            .get_latest_local_commit_hash(&repo.handle())
            .await?;

        let report = sync.push(&repo.handle(), "main").await?;

        assert_eq!(report.remote_hash, local_hash);
        assert_eq!(report.unpushed, Some(vec![]));
        Ok(())
    }

    #[tokio::test]
    async fn test_pull_with_nothing_new_is_up_to_date() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let _remote = add_origin(&repo)?;

        let report = synchronizer()
            .pull(&repo.handle(), &WorkingState::default())
            .await?;

        assert_eq!(report.outcome, PullOutcome::UpToDate);
        Ok(())
    }

    #[tokio::test]
    async fn test_cloned_branch_list_excludes_head_pointer() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        git_branch(repo.path(), "feature")?;
        let remote = add_origin(&repo)?;
        git(repo.path(), &["push", "origin", "feature"])?;

        let parent = TempDir::new()?;
        let url = remote.path().to_string_lossy().into_owned();
        let bridge = GitBridge::new();
        let clone = bridge.clone_repository(parent.path(), &url, |_| {}).await?;

        let branches = bridge.branch_list(&clone).await?;
        assert_eq!(branches.local, vec!["main"]);
        assert_eq!(branches.remote, vec!["origin/feature", "origin/main"]);
        assert!(branches.remote.iter().all(|b| !b.contains("HEAD")));
        Ok(())
    }

    #[tokio::test]
    async fn test_switch_branch_changes_current_branch() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        git_branch(repo.path(), "feature")?;
        let sync = synchronizer();

        sync.switch_branch(&repo.handle(), &WorkingState::default(), "feature", |_| {})
            .await?;

        assert_eq!(
            sync.bridge().current_branch(&repo.handle()).await?.as_deref(),
            Some("feature")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_switch_to_missing_branch_fails() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let result = GitBridge::new()
            .switch_branch(&repo.handle(), "does-not-exist")
            .await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_username_replace_and_read() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let bridge = GitBridge::new();

        assert_eq!(
            bridge.get_username(&repo.handle()).await?.as_deref(),
            Some("Test User")
        );
        bridge.replace_username(&repo.handle(), "Ann Example").await?;
        assert_eq!(
            bridge.get_username(&repo.handle()).await?.as_deref(),
            Some("Ann Example")
        );
        assert!(bridge.remote_origin(&repo.handle()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_contributors_and_toplevel() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let bridge = GitBridge::new();

        let contributors = bridge.contributors(&repo.handle()).await?;
        assert_eq!(contributors.len(), 1);
        assert_eq!(contributors[0].name, "Test User");
        assert_eq!(contributors[0].commits, 1);

        let toplevel = bridge.toplevel(&repo.handle()).await?;
        assert_eq!(toplevel.canonicalize()?, repo.path().canonicalize()?);
        Ok(())
    }

    #[tokio::test]
    async fn test_undo_last_commit_keeps_changes_staged() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(repo.path(), "extra.txt", "extra\n")?;
        git_add(repo.path(), "extra.txt")?;
        git_commit(repo.path(), "Extra")?;
        let bridge = GitBridge::new();

        bridge.undo_last_commit(&repo.handle()).await?;

        assert_eq!(bridge.commit_count(&repo.handle()).await?, 1);
        let staged = bridge.list_staged_files(&repo.handle()).await?;
        assert_eq!(paths(&staged), vec!["extra.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_git_program_is_spawn_failure() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let bridge = GitBridge::new().with_program("git-deck-no-such-program");

        let err = bridge.check_repository(&repo.handle()).await.unwrap_err();

        assert!(matches!(err, git_deck::GitDeckError::SpawnFailure { .. }));
        Ok(())
    }
}
