use log::*;
use std::path::Path;
use url::Url;

use crate::{
    dependency::PreCommitDependency,
    error::Result,
    scanner::util::{load_yaml, scalar_string},
};

pub const PRE_COMMIT_CONFIG: &str = ".pre-commit-config.yaml";

/// Hook repositories that are not fetched from anywhere.
const LOCAL_REPOS: &[&str] = &["local", "meta"];

/// Splits a hook repository URL into owner and repository name from its
/// path, whatever the host.
pub fn owner_and_repo(repository: &str) -> Option<(String, String)> {
    let url = Url::parse(repository).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some((owner.to_string(), repo.to_string()))
}

/// Reads hook pins from `.pre-commit-config.yaml` at the root of the tree.
pub struct PreCommitScanner;

impl PreCommitScanner {
    pub const NAME: &'static str = "pre-commit";

    pub fn scan(&self, root: &Path) -> Result<Vec<PreCommitDependency>> {
        let path = root.join(PRE_COMMIT_CONFIG);

        if !path.is_file() {
            return Ok(vec![]);
        }

        let Some(doc) = load_yaml(&path) else {
            return Ok(vec![]);
        };

        let Some(repos) = doc.get("repos").and_then(|r| r.as_sequence()) else {
            return Ok(vec![]);
        };

        let mut results = vec![];

        for hook in repos {
            let Some(repository) = scalar_string(hook.get("repo")) else {
                warn!("hook without repo in {}", path.display());
                continue;
            };

            if LOCAL_REPOS.contains(&repository.as_str()) {
                continue;
            }

            let Some(version) = scalar_string(hook.get("rev")) else {
                warn!("hook {repository} has no rev in {}", path.display());
                continue;
            };

            let Some((owner, repo)) = owner_and_repo(&repository) else {
                warn!("unable to parse hook repository {repository}");
                continue;
            };

            results.push(PreCommitDependency {
                repository,
                owner,
                repo,
                version,
                path: path.clone(),
            });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"repos:
  - repo: https://github.com/pre-commit/pre-commit-hooks
    rev: v3.1.0
    hooks:
      - id: check-yaml
  - repo: https://gitlab.com/pycqa/flake8.git
    rev: 3.8.1
    hooks:
      - id: flake8
  - repo: local
    hooks:
      - id: custom
"#;

    #[test]
    fn scans_hook_pins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PRE_COMMIT_CONFIG);
        fs::write(&path, CONFIG).unwrap();

        let results = PreCommitScanner.scan(tmp.path()).unwrap();

        assert_eq!(
            results,
            vec![
                PreCommitDependency {
                    repository: "https://github.com/pre-commit/pre-commit-hooks"
                        .into(),
                    owner: "pre-commit".into(),
                    repo: "pre-commit-hooks".into(),
                    version: "v3.1.0".into(),
                    path: path.clone(),
                },
                PreCommitDependency {
                    repository: "https://gitlab.com/pycqa/flake8.git".into(),
                    owner: "pycqa".into(),
                    repo: "flake8".into(),
                    version: "3.8.1".into(),
                    path,
                },
            ]
        );
    }

    #[test]
    fn missing_config_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(PreCommitScanner.scan(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn owner_and_repo_parsing() {
        assert_eq!(
            owner_and_repo("https://github.com/psf/black"),
            Some(("psf".into(), "black".into()))
        );
        assert_eq!(owner_and_repo("https://github.com/psf"), None);
        assert_eq!(owner_and_repo("not a url"), None);
    }
}
