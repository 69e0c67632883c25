use std::io::Read;

use chrono::NaiveDate;
use log::info;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use crate::config::Config;
use crate::error::Error;
use crate::time_entry::{self, TimeEntry};

/// レポートAPIへ常に付与する固定のクエリパラメータ。
///
/// 変更せず、リクエストごとにここから新しいパラメータ列を組み立てる。
const DEFAULT_REPORT_PARAMS: [(&str, &str); 16] = [
    ("rounding", "Off"),
    ("status", "active"),
    ("billable", "both"),
    ("calculate", "time"),
    ("sortDirection", "asc"),
    ("sortBy", "date"),
    ("page", "1"),
    ("with_total_currencies", "1"),
    ("subgrouping", "time_entries"),
    ("order_field", "date"),
    ("order_desc", "off"),
    ("distinct_rates", "Off"),
    ("bars_count", "31"),
    ("subgrouping_ids", "true"),
    ("date_format", "MM/DD/YYYY"),
    ("user_agent", "togglr"),
];

/// 1リクエスト分のレポート取得条件を表す構造体。
///
/// 呼び出しごとに作り直し、使い回さない。
#[derive(Clone, Debug, PartialEq)]
pub struct ReportQuery {
    pub since: NaiveDate,
    pub user_ids: Vec<i64>,
    pub tags: Vec<String>,
}

/// Toggl APIのworkspace userをデシリアライズするための構造体。
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WorkspaceUser {
    pub id: i64,
    pub email: String,
}

/// 詳細レポートCSVの1行をデシリアライズするための構造体。
///
/// 利用しない列は無視する。
#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "User")]
    user: String,
    #[serde(rename = "Start date")]
    date: String,
    #[serde(rename = "Duration")]
    duration: String,
    #[serde(rename = "Tags")]
    tags: String,
}

/// `read_report_entries`が返すtime entryのstream。
pub type TimeEntryStream = Box<dyn Iterator<Item = Result<TimeEntry, Error>>>;

/// Toggl APIと通信するためのrepository trait。
#[cfg_attr(test, automock)]
pub trait TogglRepository {
    /// 詳細レポートのtime entryを1行ずつ読み込むstreamを返す。
    ///
    /// レスポンス本文全体をバッファせず、streamを読み進めるたびに1行ずつパースする。
    fn read_report_entries(&self, query: &ReportQuery) -> Result<TimeEntryStream, Error>;

    /// workspaceに所属するuserの一覧を取得する。
    fn read_workspace_users(&self) -> Result<Vec<WorkspaceUser>, Error>;
}

/// Toggl APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = TogglClient::new(&config);
/// let users = client.read_workspace_users().unwrap();
/// ```
pub struct TogglClient {
    client: Client,
    reports_api: String,
    tracking_api: String,
    api_token: String,
    workspace: String,
}

impl TogglClient {
    /// 新しい`TogglClient`を返す。
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            reports_api: "https://api.track.toggl.com/reports/api/v2".to_string(),
            tracking_api: "https://api.track.toggl.com/api/v8".to_string(),
            api_token: config.api_token.clone(),
            workspace: config.workspace.clone(),
        }
    }

    /// 固定パラメータとクエリ条件から1リクエスト分のパラメータ列を組み立てる。
    ///
    /// 空のuser_ids/tagsはパラメータ自体を付与しない。
    fn report_params(&self, query: &ReportQuery) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = DEFAULT_REPORT_PARAMS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        params.push(("workspace_id".to_string(), self.workspace.clone()));
        params.push((
            "since".to_string(),
            query.since.format("%Y-%m-%d").to_string(),
        ));
        if !query.user_ids.is_empty() {
            let user_ids = query
                .user_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("user_ids".to_string(), user_ids));
        }
        if !query.tags.is_empty() {
            params.push(("tags".to_string(), query.tags.join(",")));
        }

        params
    }
}

impl TogglRepository for TogglClient {
    fn read_report_entries(&self, query: &ReportQuery) -> Result<TimeEntryStream, Error> {
        let response = self
            .client
            .get(format!("{}/details.csv", self.reports_api))
            .basic_auth(&self.api_token, Some("api_token"))
            .query(&self.report_params(query))
            .send()?;
        let mut response = error_for_status(response)?;
        info!("Report request succeeded: {}", response.status());

        // 本文の先頭3バイトはBOMなので、CSVとして読む前に読み捨てる
        let mut bom = [0u8; 3];
        response
            .read_exact(&mut bom)
            .map_err(|err| Error::Format(format!("Failed to skip the response BOM: {}", err)))?;

        let reader = csv::Reader::from_reader(response);
        let entries = reader.into_deserialize::<ReportRow>().map(|row| {
            row.map_err(|err| Error::Format(format!("Failed to read a report row: {}", err)))
                .and_then(to_time_entry)
        });

        Ok(Box::new(entries))
    }

    fn read_workspace_users(&self) -> Result<Vec<WorkspaceUser>, Error> {
        let response = self
            .client
            .get(format!(
                "{}/workspaces/{}/users",
                self.tracking_api, self.workspace
            ))
            .basic_auth(&self.api_token, Some("api_token"))
            .send()?;
        let response = error_for_status(response)?;

        let users = response.json::<Vec<WorkspaceUser>>()?;
        info!("length of workspace users: {}", users.len());

        Ok(users)
    }
}

/// 2xx以外のステータスをエラーへ変換する。
///
/// エラー時はレスポンス本文をそのままエラーへ含める。
fn error_for_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(Error::Request {
        status: status.as_u16(),
        body,
    })
}

/// CSVの1行をtime entryへ変換する。
fn to_time_entry(row: ReportRow) -> Result<TimeEntry, Error> {
    Ok(TimeEntry {
        duration: time_entry::parse_duration(&row.duration)?,
        tags: time_entry::split_tags(&row.tags),
        user: row.user,
        date: row.date,
    })
}
