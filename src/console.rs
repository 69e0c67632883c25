use std::io::Write;

use anyhow::{Context, Result};

use crate::report_command::TagReport;
use crate::time_entry::format_duration;
use crate::toggl::WorkspaceUser;

/// タグ名のカラムの最小幅。
const TAG_COLUMN_WIDTH: usize = 10;

/// durationのカラムの幅。
const DURATION_COLUMN_WIDTH: usize = 9;

/// Consoleに集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// タグごとの集計レポートを表示する。
    ///
    /// # Arguments
    ///
    /// * `report` - 表示する集計レポート
    fn show_tag_report(&mut self, report: &TagReport) -> Result<()>;

    /// workspaceのuser一覧を表示する。
    ///
    /// # Arguments
    ///
    /// * `users` - 表示するuser一覧
    fn show_users(&mut self, users: &[WorkspaceUser]) -> Result<()>;
}

/// 集計結果を桁揃えしたテキストで表示する。
pub struct ConsoleText<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleText<'a, W> {
    /// 新しい`ConsoleText`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleText<'a, W> {
    // タグごとに1行、`tag:  H:MM:SS (xx.xx%)`の形式で表示する。
    fn show_tag_report(&mut self, report: &TagReport) -> Result<()> {
        for (tag, duration) in report.durations() {
            writeln!(
                self.writer,
                "{:<tag_width$}  {:>duration_width$} ({:.2}%)",
                format!("{}:", tag),
                format_duration(*duration),
                report.percentage(*duration),
                tag_width = TAG_COLUMN_WIDTH,
                duration_width = DURATION_COLUMN_WIDTH,
            )
            .with_context(|| format!("Failed to write report line for tag: {}", tag))?;
        }

        Ok(())
    }

    // userごとに1行、`id  email`の形式で表示する。
    fn show_users(&mut self, users: &[WorkspaceUser]) -> Result<()> {
        for user in users {
            writeln!(
                self.writer,
                "{:<width$}  {}",
                user.id,
                user.email,
                width = TAG_COLUMN_WIDTH,
            )
            .with_context(|| format!("Failed to write user line for id: {}", user.id))?;
        }

        Ok(())
    }
}
