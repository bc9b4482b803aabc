//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};

mod graphql;

use crate::{
    error::{FreshenError, Result},
    forge::{
        config::{CONNECT_TIMEOUT, READ_TIMEOUT, RemoteConfig, TAG_PAGE_SIZE},
        github::graphql::{
            ENABLE_AUTO_MERGE_MUTATION, EnableAutoMergeVariables,
            PR_ID_QUERY, PrIdQueryVariables, PrIdResult,
        },
        traits::Forge,
        types::{
            AutoMergeRequest, CreatePrRequest, GetPrRequest, GithubRepo,
            GithubUser, PullRequest, UpdatePrRequest,
        },
    },
};

/// Branch assumed when the repository metadata has none.
pub const FALLBACK_DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagInfo {
    name: String,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct OpenPrParams {
    state: &'static str,
    head: String,
    base: String,
}

#[derive(Debug, Serialize)]
struct CreatePrBody {
    title: String,
    body: String,
    head: String,
    base: String,
    maintainer_can_modify: bool,
    draft: bool,
}

#[derive(Debug, Serialize)]
struct UpdatePrBody {
    title: String,
    body: String,
}

/// GitHub forge implementation using Octocrab for REST and GraphQL calls.
pub struct Github {
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_base.as_str())?
            .set_connect_timeout(Some(CONNECT_TIMEOUT))
            .set_read_timeout(Some(READ_TIMEOUT))
            .build()?;

        Ok(Self { instance })
    }

    async fn pull_request_node_id(
        &self,
        req: &AutoMergeRequest,
    ) -> Result<String> {
        let vars = PrIdQueryVariables {
            owner: req.repo.owner.clone(),
            repo: req.repo.repo.clone(),
            pr_number: req.pr_number,
        };

        let json = serde_json::json!({
          "query": PR_ID_QUERY,
          "variables": vars,
        });

        let result: PrIdResult = self.instance.graphql(&json).await?;

        Ok(result.data.repository.pull_request.id)
    }
}

#[async_trait]
impl Forge for Github {
    async fn current_user(&self) -> Result<GithubUser> {
        let user: GithubUser = self.instance.get("/user", None::<&()>).await?;
        debug!("authenticated as {}", user.login);
        Ok(user)
    }

    async fn default_branch(&self, repo: &GithubRepo) -> Result<String> {
        let route = format!("/repos/{}/{}", repo.owner, repo.repo);
        let info: RepoInfo = self.instance.get(route, None::<&()>).await?;

        match info.default_branch {
            Some(branch) => Ok(branch),
            None => {
                warn!(
                    "no default branch reported for {repo}: assuming {FALLBACK_DEFAULT_BRANCH}"
                );
                Ok(FALLBACK_DEFAULT_BRANCH.to_string())
            }
        }
    }

    async fn list_tags(&self, repo: &GithubRepo) -> Result<Vec<String>> {
        let route = format!("/repos/{}/{}/tags", repo.owner, repo.repo);
        let mut tags = vec![];
        let mut page = 1;

        loop {
            let params = PageParams {
                per_page: TAG_PAGE_SIZE,
                page,
            };

            let batch: Vec<TagInfo> =
                self.instance.get(&route, Some(&params)).await?;
            let count = batch.len();

            tags.extend(batch.into_iter().map(|t| t.name));

            if count < TAG_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        debug!("found {} tags for {repo}", tags.len());

        Ok(tags)
    }

    async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>> {
        let route = format!("/repos/{}/{}/pulls", req.repo.owner, req.repo.repo);
        let params = OpenPrParams {
            state: "open",
            head: format!("{}:{}", req.repo.owner, req.head_branch),
            base: req.base_branch,
        };

        let prs: Vec<PullRequest> =
            self.instance.get(route, Some(&params)).await?;

        Ok(prs.into_iter().next())
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let route = format!("/repos/{}/{}/pulls", req.repo.owner, req.repo.repo);
        let body = CreatePrBody {
            title: req.title,
            body: req.body,
            head: req.head_branch,
            base: req.base_branch,
            maintainer_can_modify: true,
            draft: false,
        };

        let pr: PullRequest = self.instance.post(route, Some(&body)).await?;

        Ok(pr)
    }

    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        let route = format!(
            "/repos/{}/{}/pulls/{}",
            req.repo.owner, req.repo.repo, req.pr_number
        );
        let body = UpdatePrBody {
            title: req.title,
            body: req.body,
        };

        let _: serde_json::Value =
            self.instance.patch(route, Some(&body)).await?;

        Ok(())
    }

    async fn enable_auto_merge(&self, req: AutoMergeRequest) -> Result<()> {
        let pr_id = self.pull_request_node_id(&req).await?;
        debug!("enabling auto-merge for {}#{}", req.repo, req.pr_number);

        let vars = EnableAutoMergeVariables { pr_id };

        let json = serde_json::json!({
          "query": ENABLE_AUTO_MERGE_MUTATION,
          "variables": vars,
        });

        let result: serde_json::Value = self.instance.graphql(&json).await?;

        if let Some(errors) = result.get("errors") {
            return Err(FreshenError::forge(format!(
                "enabling auto-merge on {}#{} failed: {errors}",
                req.repo, req.pr_number
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path, query_param},
    };

    fn repo() -> GithubRepo {
        GithubRepo::new("lsst-sqre", "sqrbot")
    }

    fn github(server: &MockServer) -> Github {
        Github::new(RemoteConfig {
            api_base: server.uri(),
            token: SecretString::from("some-token".to_string()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn current_user_reads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "someone",
                "id": 1234,
                "name": "Some User",
                "email": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = github(&server).current_user().await.unwrap();

        assert_eq!(user.login, "someone");
        assert_eq!(user.name.as_deref(), Some("Some User"));
        assert_eq!(user.email, None);
    }

    #[tokio::test]
    async fn default_branch_falls_back_to_main() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/lsst-sqre/sqrbot"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1})),
            )
            .mount(&server)
            .await;

        let branch = github(&server).default_branch(&repo()).await.unwrap();
        assert_eq!(branch, "main");
    }

    #[tokio::test]
    async fn default_branch_from_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/lsst-sqre/sqrbot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"id": 1, "default_branch": "master"}),
            ))
            .mount(&server)
            .await;

        let branch = github(&server).default_branch(&repo()).await.unwrap();
        assert_eq!(branch, "master");
    }

    #[tokio::test]
    async fn list_tags_follows_pages() {
        let server = MockServer::start().await;
        let first: Vec<_> = (0..100)
            .map(|i| json!({"name": format!("0.{i}.0")}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/repos/lsst-sqre/sqrbot/tags"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(first))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/lsst-sqre/sqrbot/tags"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"name": "1.0.0"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tags = github(&server).list_tags(&repo()).await.unwrap();

        assert_eq!(tags.len(), 101);
        assert_eq!(tags.last().map(String::as_str), Some("1.0.0"));
    }

    #[tokio::test]
    async fn list_tags_missing_repo_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/lsst-sqre/sqrbot/tags"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com"
            })))
            .mount(&server)
            .await;

        assert!(github(&server).list_tags(&repo()).await.is_err());
    }

    #[tokio::test]
    async fn find_open_pr_filters_by_head_and_base() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/lsst-sqre/sqrbot/pulls"))
            .and(query_param("state", "open"))
            .and(query_param("head", "lsst-sqre:u/freshen"))
            .and(query_param("base", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"number": 7, "node_id": "PR_seven"},
                {"number": 9, "node_id": "PR_nine"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let pr = github(&server)
            .find_open_pr(GetPrRequest {
                repo: repo(),
                head_branch: "u/freshen".into(),
                base_branch: "main".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            pr,
            Some(PullRequest { number: 7 })
        );
    }

    #[tokio::test]
    async fn create_pr_posts_expected_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/lsst-sqre/sqrbot/pulls"))
            .and(body_partial_json(json!({
                "title": "Update dependencies",
                "body": "- Update thing\n",
                "head": "u/freshen",
                "base": "main",
                "maintainer_can_modify": true,
                "draft": false
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"number": 12})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let pr = github(&server)
            .create_pr(CreatePrRequest {
                repo: repo(),
                head_branch: "u/freshen".into(),
                base_branch: "main".into(),
                title: "Update dependencies".into(),
                body: "- Update thing\n".into(),
            })
            .await
            .unwrap();

        assert_eq!(pr.number, 12);
    }

    #[tokio::test]
    async fn update_pr_patches_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/lsst-sqre/sqrbot/pulls/12"))
            .and(body_partial_json(json!({
                "title": "Update dependencies",
                "body": "- Update thing\n"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"number": 12})),
            )
            .expect(1)
            .mount(&server)
            .await;

        github(&server)
            .update_pr(UpdatePrRequest {
                repo: repo(),
                pr_number: 12,
                title: "Update dependencies".into(),
                body: "- Update thing\n".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn enable_auto_merge_resolves_node_id_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"pr_number": 12}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"repository": {"pullRequest": {"id": "PR_twelve"}}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"pr_id": "PR_twelve"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"enablePullRequestAutoMerge": {"actor": {"login": "someone"}}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        github(&server)
            .enable_auto_merge(AutoMergeRequest {
                repo: repo(),
                pr_number: 12,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn enable_auto_merge_reports_graphql_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"pr_number": 12}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"repository": {"pullRequest": {"id": "PR_twelve"}}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"pr_id": "PR_twelve"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "auto-merge is not allowed"}]
            })))
            .mount(&server)
            .await;

        let result = github(&server)
            .enable_auto_merge(AutoMergeRequest {
                repo: repo(),
                pr_number: 12,
            })
            .await;

        assert!(matches!(result, Err(FreshenError::ForgeError(_))));
    }
}
