use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;

pub type Result<T> = anyhow::Result<T>;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// A Dependabot vulnerability alert as returned by the GitHub API. Only the
/// fields we print are deserialized; the rest of the record is ignored.
#[derive(Deserialize)]
pub struct Alert {
    pub id: u64,
    pub severity: String,
    pub repository: Repository,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct Repository {
    pub owner: Owner,
}

#[derive(Deserialize)]
pub struct Owner {
    pub login: String,
}

fn org_alerts_url(base: &str, org: &str) -> String {
    format!("{base}/orgs/{org}/vulnerability-alerts")
}

fn repo_alerts_url(base: &str, org: &str, repo: &str) -> String {
    format!("{base}/repos/{org}/{repo}/vulnerability-alerts")
}

pub fn make_client(token: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        headers.insert("Authorization", value);
    }
    // GitHub rejects requests without a User-Agent
    let client = Client::builder()
        .user_agent("gh-alerts")
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch alerts for the whole org, or one request per named repository in
/// list order. A non-200 response contributes nothing; only transport-level
/// failures are errors.
pub async fn fetch_alerts(
    client: &Client,
    base: &str,
    org: &str,
    repos: Option<&[String]>,
) -> Result<Vec<Alert>> {
    let mut alerts = Vec::new();
    match repos {
        Some(repos) => {
            for repo in repos {
                let resp = client.get(repo_alerts_url(base, org, repo)).send().await?;
                if resp.status() == StatusCode::OK {
                    alerts.extend(resp.json::<Vec<Alert>>().await?);
                } else {
                    log::warn!("skipping {org}/{repo}: status {}", resp.status());
                }
            }
        }
        None => {
            let resp = client.get(org_alerts_url(base, org)).send().await?;
            if resp.status() == StatusCode::OK {
                alerts = resp.json().await?;
            } else {
                log::warn!("org-wide request for {org} returned {}", resp.status());
            }
        }
    }
    log::debug!("collected {} alerts for org {org}", alerts.len());
    Ok(alerts)
}

pub fn render_table(alerts: &[Alert]) -> String {
    let mut out = String::from("ID\t\tSeverity\tOwner\t\tCreated On\n");
    out.push_str("---------------------------------------------------\n");
    for alert in alerts {
        out.push_str(&format!(
            "{}\t{}\t\t{}\t\t{}\n",
            alert.id, alert.severity, alert.repository.owner.login, alert.created_at
        ));
    }
    out
}

pub async fn report(org: &str, repos: Option<&[String]>, token: Option<&str>) -> Result<()> {
    let client = make_client(token)?;
    let alerts = fetch_alerts(&client, GITHUB_API_BASE, org, repos).await?;
    log::info!("fetched {} alerts for org: {org}", alerts.len());
    print!("{}", render_table(&alerts));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: u64, severity: &str, owner: &str, created_at: &str) -> Alert {
        Alert {
            id,
            severity: severity.to_string(),
            repository: Repository {
                owner: Owner { login: owner.to_string() },
            },
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn deserialize_alert_from_api_record() {
        let json = r#"{
            "id": 1,
            "severity": "high",
            "repository": {"owner": {"login": "acme"}},
            "created_at": "2024-01-01T00:00:00Z",
            "dismissed_at": null
        }"#;
        let alert: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.id, 1);
        assert_eq!(alert.severity, "high");
        assert_eq!(alert.repository.owner.login, "acme");
        assert_eq!(alert.created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn deserialize_rejects_missing_field() {
        let json = r#"{"id": 1, "severity": "high", "created_at": "2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Alert>(json).is_err());
    }

    #[test]
    fn render_one_row_per_alert() {
        let alerts = vec![
            alert(1, "high", "acme", "2024-01-01T00:00:00Z"),
            alert(2, "low", "acme", "2024-02-01T00:00:00Z"),
        ];
        let table = render_table(&alerts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ID\t\tSeverity\tOwner\t\tCreated On");
        assert_eq!(lines[2], "1\thigh\t\tacme\t\t2024-01-01T00:00:00Z");
        assert_eq!(lines[3], "2\tlow\t\tacme\t\t2024-02-01T00:00:00Z");
    }

    #[test]
    fn render_empty_list_is_header_only() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn url_shapes() {
        assert_eq!(
            org_alerts_url(GITHUB_API_BASE, "acme"),
            "https://api.github.com/orgs/acme/vulnerability-alerts"
        );
        assert_eq!(
            repo_alerts_url(GITHUB_API_BASE, "acme", "api"),
            "https://api.github.com/repos/acme/api/vulnerability-alerts"
        );
    }
}
