use anyhow::{Context, Result};
use log::info;

use crate::error::Error;
use crate::time_entry::{format_duration, TimeEntry};
use crate::toggl::{ReportQuery, TogglRepository};

/// タグごとの集計結果を表す構造体。
///
/// 表示順を安定させるため、要求されたタグの順序で保持し、最後に`other`を置く。
#[derive(Clone, Debug, PartialEq)]
pub struct TagReport {
    durations: Vec<(String, i64)>,
    total: i64,
}

impl TagReport {
    /// タグ名と秒数の組を表示順に返す。
    pub fn durations(&self) -> &[(String, i64)] {
        &self.durations
    }

    /// 全time entryの合計秒数を返す。
    pub fn total(&self) -> i64 {
        self.total
    }

    /// 合計秒数に対する割合を返す。
    ///
    /// 合計が0の場合はゼロ除算を避け、常に0.0を返す。
    pub fn percentage(&self, duration: i64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        duration as f64 / self.total as f64 * 100.0
    }
}

/// time entryのstreamからタグごとの集計を1パスで計算する。
///
/// タグの比較は小文字化して行い、表示には要求されたタグ名をそのまま利用する。
/// 複数の要求タグに一致したtime entryは、一致したタグすべてへ全量を加算する。
/// このため要求タグが重複して付与されていると`other`は負になり得るが、そのまま保持する。
pub fn aggregate_tags<I>(tags: &[String], entries: I) -> Result<TagReport, Error>
where
    I: IntoIterator<Item = Result<TimeEntry, Error>>,
{
    let mut durations: Vec<(String, i64)> = tags.iter().map(|tag| (tag.clone(), 0)).collect();
    let mut total = 0;

    for entry in entries {
        let entry = entry?;
        total += entry.duration;

        let entry_tags: Vec<String> = entry.tags.iter().map(|tag| tag.to_lowercase()).collect();
        for (tag, duration) in durations.iter_mut() {
            if entry_tags.contains(&tag.to_lowercase()) {
                *duration += entry.duration;
            }
        }
    }

    let tagged: i64 = durations.iter().map(|(_, duration)| duration).sum();
    durations.push(("other".to_string(), total - tagged));

    Ok(TagReport { durations, total })
}

/// タグごとの集計レポートを作成するコマンド。
pub struct ReportCommand<'a, T: TogglRepository> {
    toggl_client: &'a T,
}

impl<'a, T: TogglRepository> ReportCommand<'a, T> {
    /// 新しい`ReportCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    pub fn new(toggl_client: &'a T) -> Self {
        Self { toggl_client }
    }

    /// 詳細レポートを取得し、タグごとの集計結果を返す。
    ///
    /// # Arguments
    ///
    /// * `query` - レポートの取得条件。`query.tags`が集計対象のタグになる。
    pub fn run(&self, query: &ReportQuery) -> Result<TagReport> {
        let entries = self
            .toggl_client
            .read_report_entries(query)
            .context("Failed to retrieve report entries")?;
        let report =
            aggregate_tags(&query.tags, entries).context("Failed to aggregate report entries")?;
        info!(
            "Report aggregated successfully. Total time: {}",
            format_duration(report.total())
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::aggregate_tags;
    use super::ReportCommand;
    use crate::error::Error;
    use crate::time_entry::TimeEntry;
    use crate::toggl::{MockTogglRepository, ReportQuery};

    /// 要求タグに一致した時間と`other`へ集計されることを確認する。
    #[test]
    fn test_aggregate_tags() {
        let entries = vec![
            Ok(dummy_entry(3600, &["work"])),
            Ok(dummy_entry(1800, &["personal"])),
        ];

        let report = aggregate_tags(&["work".to_string()], entries).unwrap();

        assert_eq!(
            report.durations(),
            &[("work".to_string(), 3600), ("other".to_string(), 1800)]
        );
        assert_eq!(report.total(), 5400);
        assert!((report.percentage(3600) - 200.0 / 3.0).abs() < 1e-9);
        assert!((report.percentage(1800) - 100.0 / 3.0).abs() < 1e-9);
    }

    /// time entryが1件もない場合に、すべて0秒かつ0.0%になることを確認する。
    #[test]
    fn test_aggregate_tags_no_entries() {
        let report = aggregate_tags(&["work".to_string()], vec![]).unwrap();

        assert_eq!(
            report.durations(),
            &[("work".to_string(), 0), ("other".to_string(), 0)]
        );
        assert_eq!(report.total(), 0);
        assert_eq!(report.percentage(0), 0.0);
    }

    /// 重複しないタグでは、タグごとの合計と`other`の和が全体と一致することを確認する。
    #[rstest]
    #[case::all_tagged(vec![
        Ok(dummy_entry(3600, &["work"])),
        Ok(dummy_entry(1800, &["personal"])),
    ])]
    #[case::partially_tagged(vec![
        Ok(dummy_entry(3600, &["work"])),
        Ok(dummy_entry(1800, &[])),
        Ok(dummy_entry(600, &["meeting"])),
    ])]
    fn test_aggregate_tags_disjoint_sums_to_total(
        #[case] entries: Vec<Result<TimeEntry, Error>>,
    ) {
        let tags = vec!["work".to_string(), "personal".to_string()];

        let report = aggregate_tags(&tags, entries).unwrap();

        let sum: i64 = report.durations().iter().map(|(_, duration)| duration).sum();
        assert_eq!(sum, report.total());
    }

    /// タグの比較が大文字小文字を無視して行われることを確認する。
    #[test]
    fn test_aggregate_tags_case_insensitive() {
        let entries = vec![Ok(dummy_entry(3600, &["Work"]))];

        let report = aggregate_tags(&["work".to_string()], entries).unwrap();

        assert_eq!(
            report.durations(),
            &[("work".to_string(), 3600), ("other".to_string(), 0)]
        );
    }

    /// 表示用のタグ名が要求された表記のまま保持されることを確認する。
    #[test]
    fn test_aggregate_tags_keeps_requested_case() {
        let entries = vec![Ok(dummy_entry(3600, &["work"]))];

        let report = aggregate_tags(&["Work".to_string()], entries).unwrap();

        assert_eq!(
            report.durations(),
            &[("Work".to_string(), 3600), ("other".to_string(), 0)]
        );
    }

    /// 複数の要求タグに一致した場合、全量が各タグへ加算され`other`が負になることを確認する。
    #[test]
    fn test_aggregate_tags_overlapping_tags() {
        let entries = vec![Ok(dummy_entry(3600, &["work", "urgent"]))];
        let tags = vec!["work".to_string(), "urgent".to_string()];

        let report = aggregate_tags(&tags, entries).unwrap();

        assert_eq!(
            report.durations(),
            &[
                ("work".to_string(), 3600),
                ("urgent".to_string(), 3600),
                ("other".to_string(), -3600),
            ]
        );
        assert_eq!(report.total(), 3600);
    }

    /// 要求タグの順序が表示順に保持されることを確認する。
    #[test]
    fn test_aggregate_tags_keeps_requested_order() {
        let entries = vec![Ok(dummy_entry(3600, &["b"])), Ok(dummy_entry(1800, &["a"]))];
        let tags = vec!["b".to_string(), "a".to_string()];

        let report = aggregate_tags(&tags, entries).unwrap();

        let names: Vec<&str> = report
            .durations()
            .iter()
            .map(|(tag, _)| tag.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "other"]);
    }

    /// streamの途中のエラーが集計のエラーとして返ることを確認する。
    #[test]
    fn test_aggregate_tags_propagates_stream_error() {
        let entries = vec![
            Ok(dummy_entry(3600, &["work"])),
            Err(Error::Format("Invalid duration: abc".to_string())),
        ];

        let result = aggregate_tags(&["work".to_string()], entries);

        assert!(matches!(result, Err(Error::Format(_))));
    }

    /// コマンドがリポジトリから取得したstreamを集計して返すことを確認する。
    #[test]
    fn test_report_command() {
        let mut toggl = MockTogglRepository::new();
        toggl
            .expect_read_report_entries()
            .times(1)
            .returning(|_| Ok(Box::new(vec![Ok(dummy_entry(3600, &["work"]))].into_iter())));

        let command = ReportCommand::new(&toggl);
        let report = command.run(&test_query()).unwrap();

        assert_eq!(
            report.durations(),
            &[("work".to_string(), 3600), ("other".to_string(), 0)]
        );
    }

    /// リポジトリのエラーがコマンドのエラーとして返ることを確認する。
    #[test]
    fn test_report_command_request_error() {
        let mut toggl = MockTogglRepository::new();
        toggl.expect_read_report_entries().times(1).returning(|_| {
            Err(Error::Request {
                status: 500,
                body: "internal error".to_string(),
            })
        });

        let command = ReportCommand::new(&toggl);
        let result = command.run(&test_query());

        assert!(result.is_err());
    }

    /// テスト用にダミーのTimeEntryを作成する。
    fn dummy_entry(duration: i64, tags: &[&str]) -> TimeEntry {
        TimeEntry {
            duration,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            user: "alice".to_string(), // 集計では利用しないのでなんでも良い
            date: "07/01/2026".to_string(), // 集計では利用しないのでなんでも良い
        }
    }

    /// テスト用のレポート取得条件を作成する。
    fn test_query() -> ReportQuery {
        ReportQuery {
            since: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            user_ids: vec![],
            tags: vec!["work".to_string()],
        }
    }
}
