mod common;

use anyhow::Result;
use common::write_deckrc;
use deck::DeckContext;
use deck::config::{CONFIG_ENV, Config, SYSTEM_CONFIG_FILE, USER_CONFIG_FILE};
use deck::error::DeckError;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn point_env_at(config: Option<&Path>, home: &Path) {
    unsafe {
        match config {
            Some(path) => std::env::set_var(CONFIG_ENV, path),
            None => std::env::remove_var(CONFIG_ENV),
        }
        std::env::set_var("HOME", home);
    }
}

#[test]
#[serial]
fn test_env_variable_wins_over_home() -> Result<()> {
    let dir = tempdir()?;
    let from_env = write_deckrc(&dir.path().join("env"))?;
    let home = dir.path().join("home");
    write_deckrc(&home)?;
    fs::rename(home.join("deckrc"), home.join(USER_CONFIG_FILE))?;

    point_env_at(Some(&from_env), &home);
    assert_eq!(Config::discover(None)?, from_env);
    Ok(())
}

#[test]
#[serial]
fn test_home_deckrc_used_without_env() -> Result<()> {
    let dir = tempdir()?;
    write_deckrc(dir.path())?;
    let user_config = dir.path().join(USER_CONFIG_FILE);
    fs::rename(dir.path().join("deckrc"), &user_config)?;

    point_env_at(None, dir.path());
    assert_eq!(Config::discover(None)?, user_config);
    Ok(())
}

#[test]
#[serial]
fn test_env_pointing_nowhere_falls_through() -> Result<()> {
    let dir = tempdir()?;
    write_deckrc(dir.path())?;
    let user_config = dir.path().join(USER_CONFIG_FILE);
    fs::rename(dir.path().join("deckrc"), &user_config)?;

    point_env_at(Some(&dir.path().join("missing")), dir.path());
    assert_eq!(Config::discover(None)?, user_config);
    Ok(())
}

#[test]
#[serial]
fn test_nothing_found_lists_candidates() -> Result<()> {
    if Path::new(SYSTEM_CONFIG_FILE).exists() {
        return Ok(());
    }
    let dir = tempdir()?;
    point_env_at(None, dir.path());

    let err = Config::discover(None).unwrap_err();
    match err.downcast_ref::<DeckError>() {
        Some(DeckError::ConfigNotFound(candidates)) => {
            assert!(candidates.contains(&dir.path().join(USER_CONFIG_FILE)));
            assert!(candidates.contains(&Path::new(SYSTEM_CONFIG_FILE).to_path_buf()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
#[serial]
fn test_explicit_path_skips_discovery() -> Result<()> {
    let dir = tempdir()?;
    let explicit = write_deckrc(dir.path())?;
    point_env_at(Some(&dir.path().join("elsewhere")), dir.path());

    assert_eq!(Config::discover(Some(&explicit))?, explicit);
    assert!(Config::discover(Some(&dir.path().join("nope"))).is_err());
    Ok(())
}

#[test]
fn test_load_context_from_file() -> Result<()> {
    let dir = tempdir()?;
    let path = write_deckrc(dir.path())?;

    let ctx = DeckContext::load(Some(&path))?;

    assert_eq!(ctx.root(), dir.path().join("root"));
    assert!(dir.path().join("data").join(deck::DB_FILE).exists());
    Ok(())
}

#[test]
fn test_load_accepts_capitalized_keys() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("root"))?;
    let path = dir.path().join("deckrc");
    fs::write(
        &path,
        format!(
            "Root = \"{}\"\nData = \"{}\"\nGitAware = false\nIgnore = [\"\\\\.swp$\"]\n",
            dir.path().join("root").display(),
            dir.path().join("data").display()
        ),
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.ignore, vec![r"\.swp$".to_string()]);
    assert!(!config.git_aware);
    Ok(())
}

#[test]
fn test_missing_root_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let config = Config {
        root: dir.path().join("absent"),
        data: dir.path().join("data"),
        prune: Vec::new(),
        ignore: Vec::new(),
        git_aware: false,
    };

    let err = DeckContext::open(config).err().expect("open should fail");
    assert!(matches!(
        err.downcast_ref::<DeckError>(),
        Some(DeckError::RootNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_bad_pattern_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let mut config = common::test_config(dir.path(), &[], &[])?;
    config.prune.push("([unclosed".to_string());

    let err = DeckContext::open(config).err().expect("open should fail");
    assert!(matches!(
        err.downcast_ref::<DeckError>(),
        Some(DeckError::InvalidPattern { .. })
    ));
    Ok(())
}
