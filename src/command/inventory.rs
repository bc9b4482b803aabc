//! `helm-inventory` and `github-inventory` command implementations.
use color_eyre::eyre::{WrapErr, eyre};
use std::collections::BTreeMap;

use crate::{
    command::to_yaml,
    config::Config,
    factory::Factory,
    inventory::{GitHubInventory, HelmInventory},
    result::Result,
};

/// Latest version of each chart at `url`, as YAML.
pub async fn render_helm(
    inventory: &dyn HelmInventory,
    url: &str,
) -> Result<String> {
    let versions = inventory
        .inventory(url)
        .await
        .wrap_err_with(|| format!("inventorying {url} failed"))?;
    to_yaml(&versions)
}

/// Latest tag of `owner/repo`, as a single-entry YAML mapping.
pub async fn render_github(
    inventory: &dyn GitHubInventory,
    owner: &str,
    repo: &str,
    semantic: bool,
) -> Result<String> {
    let latest = inventory
        .inventory(owner, repo, semantic)
        .await
        .ok_or_else(|| eyre!("no usable tags found for {owner}/{repo}"))?;

    to_yaml(&BTreeMap::from([(format!("{owner}/{repo}"), latest)]))
}

/// Execute `helm-inventory`.
pub async fn execute_helm(config: Config, url: &str) -> Result<()> {
    let inventory = Factory::new(config).create_helm_inventory()?;
    print!("{}", render_helm(inventory.as_ref(), url).await?);
    Ok(())
}

/// Execute `github-inventory`.
pub async fn execute_github(
    config: Config,
    owner: &str,
    repo: &str,
    semantic: bool,
) -> Result<()> {
    let inventory = Factory::new(config).create_github_inventory()?;
    print!(
        "{}",
        render_github(inventory.as_ref(), owner, repo, semantic).await?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{HelmRepositoryInventory, MockGitHubInventory};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn renders_helm_inventory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "entries:\n  redis:\n    - version: 1.0.0\n    - version: 1.2.0\n",
            ))
            .mount(&server)
            .await;

        let inventory = HelmRepositoryInventory::new().unwrap();
        let output = render_helm(&inventory, &server.uri()).await.unwrap();

        assert_eq!(output, "redis: 1.2.0\n");
    }

    #[tokio::test]
    async fn renders_github_inventory() {
        let mut inventory = MockGitHubInventory::new();
        inventory
            .expect_inventory()
            .returning(|_, _, _| Some("v1.2.3".into()));

        let output = render_github(&inventory, "lsst-sqre", "gafaelfawr", true)
            .await
            .unwrap();

        assert_eq!(output, "lsst-sqre/gafaelfawr: v1.2.3\n");
    }

    #[tokio::test]
    async fn missing_tags_is_an_error() {
        let mut inventory = MockGitHubInventory::new();
        inventory.expect_inventory().returning(|_, _, _| None);

        let err = render_github(&inventory, "lsst-sqre", "empty", false)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no usable tags found for lsst-sqre/empty");
    }
}
