//! Tests for layered request resolution

use std::fs;
use std::time::Duration;

use deploy_core::{ConfigResolver, DeploySettings, Error};
use deploy_svn::Revision;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_request_file_and_overrides_are_merged() {
    let temp = TempDir::new().unwrap();
    let global = temp.path().join("global");
    write(&temp, "global/config.toml", "username = 'deploy'\ntimeout_secs = 300\n");
    let request = write(
        &temp,
        "deploy.yaml",
        "repo: svn+ssh://host/repo/trunk\ndest: /srv/app\nversion: 40\nforce: true\n",
    );

    let resolved = ConfigResolver::new()
        .with_global_config_dir(&global)
        .with_request_file(&request)
        .resolve(DeploySettings {
            revision: Some(Revision::Number(41)),
            ..Default::default()
        })
        .unwrap();

    let desired = &resolved.desired;
    assert_eq!(desired.repo_url(), "svn+ssh://host/repo/trunk");
    assert_eq!(desired.dest().as_str(), "/srv/app");
    assert_eq!(desired.revision(), &Revision::Number(41));
    assert!(desired.force());
    assert_eq!(desired.credentials().username.as_deref(), Some("deploy"));
    assert_eq!(resolved.client.timeout, Some(Duration::from_secs(300)));
}

#[test]
fn test_missing_global_config_is_skipped() {
    let temp = TempDir::new().unwrap();

    let resolved = ConfigResolver::new()
        .with_global_config_dir(temp.path().join("nowhere"))
        .resolve(DeploySettings {
            repo: Some("svn://host/repo".into()),
            dest: Some("/srv/app".into()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(resolved.desired.revision(), &Revision::Head);
    assert!(resolved.desired.switch());
    assert!(resolved.client.trust_server_cert);
}

#[test]
fn test_missing_request_file_is_an_error() {
    let temp = TempDir::new().unwrap();

    let result = ConfigResolver::new()
        .with_global_config_dir(temp.path())
        .with_request_file(temp.path().join("absent.toml"))
        .resolve(DeploySettings::default());

    assert!(matches!(result, Err(Error::Fs(_))));
}

#[test]
fn test_json_request_file() {
    let temp = TempDir::new().unwrap();
    let request = write(
        &temp,
        "deploy.json",
        r#"{"repository": "svn://host/repo", "dest": "/srv/app", "export": true, "switch": false}"#,
    );

    let resolved = ConfigResolver::new()
        .with_global_config_dir(temp.path().join("global"))
        .with_request_file(&request)
        .resolve(DeploySettings::default())
        .unwrap();

    assert!(resolved.desired.export_only());
    assert!(!resolved.desired.switch());
}

#[test]
fn test_missing_repo_is_invalid_request() {
    let temp = TempDir::new().unwrap();

    let result = ConfigResolver::new()
        .with_global_config_dir(temp.path())
        .resolve(DeploySettings {
            dest: Some("/srv/app".into()),
            ..Default::default()
        });

    assert!(matches!(result, Err(Error::InvalidRequest { message }) if message.contains("repo")));
}

#[test]
fn test_relative_dest_resolves_against_working_dir() {
    let temp = TempDir::new().unwrap();

    let resolved = ConfigResolver::new()
        .with_global_config_dir(temp.path().join("global"))
        .with_working_dir(temp.path())
        .resolve(DeploySettings {
            repo: Some("svn://host/repo".into()),
            dest: Some("checkout".into()),
            ..Default::default()
        })
        .unwrap();

    assert!(resolved.desired.dest().is_absolute());
    assert_eq!(resolved.desired.dest().file_name(), Some("checkout"));
}

#[cfg(unix)]
#[test]
fn test_drive_dest_is_relative_on_unix() {
    let temp = TempDir::new().unwrap();

    let resolved = ConfigResolver::new()
        .with_global_config_dir(temp.path().join("global"))
        .with_working_dir(temp.path())
        .resolve(DeploySettings {
            repo: Some("svn+ssh://host/repo".into()),
            dest: Some("C:\\src\\checkout".into()),
            ..Default::default()
        })
        .unwrap();

    let dest = resolved.desired.dest().to_native();
    assert!(dest.is_absolute());
    assert!(dest.starts_with(temp.path()));
}

#[test]
fn test_relative_dest_without_working_dir_is_rejected() {
    let temp = TempDir::new().unwrap();

    let result = ConfigResolver::new()
        .with_global_config_dir(temp.path())
        .resolve(DeploySettings {
            repo: Some("svn://host/repo".into()),
            dest: Some("checkout".into()),
            ..Default::default()
        });

    assert!(matches!(result, Err(Error::InvalidRequest { .. })));
}

#[test]
fn test_invalid_revision_in_file_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let request = write(&temp, "deploy.toml", "repo = 'svn://x'\ndest = '/srv/app'\nrevision = 'tip'\n");

    let result = ConfigResolver::new()
        .with_global_config_dir(temp.path().join("global"))
        .with_request_file(&request)
        .resolve(DeploySettings::default());

    assert!(result.is_err());
}
