use serde::{Deserialize, Serialize};

pub const PR_ID_QUERY: &str = r#"
query PullRequestId($owner: String!, $repo: String!, $pr_number: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $pr_number) {
      id
    }
  }
}"#;

pub const ENABLE_AUTO_MERGE_MUTATION: &str = r#"
mutation EnableAutoMerge($pr_id: ID!) {
  enablePullRequestAutoMerge(input: { pullRequestId: $pr_id }) {
    actor {
      login
    }
    clientMutationId
  }
}"#;

#[derive(Debug, Serialize)]
pub struct PrIdQueryVariables {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

#[derive(Debug, Deserialize)]
pub struct PrIdPullRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct PrIdRepository {
    #[serde(rename = "pullRequest")]
    pub pull_request: PrIdPullRequest,
}

#[derive(Debug, Deserialize)]
pub struct PrIdData {
    pub repository: PrIdRepository,
}

#[derive(Debug, Deserialize)]
pub struct PrIdResult {
    pub data: PrIdData,
}

#[derive(Debug, Serialize)]
pub struct EnableAutoMergeVariables {
    pub pr_id: String,
}
