use anyhow::{Context, Result};
use log::info;

use crate::toggl::{TogglRepository, WorkspaceUser};

/// workspaceのuser一覧を取得するコマンド。
pub struct UsersCommand<'a, T: TogglRepository> {
    toggl_client: &'a T,
}

impl<'a, T: TogglRepository> UsersCommand<'a, T> {
    /// 新しい`UsersCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    pub fn new(toggl_client: &'a T) -> Self {
        Self { toggl_client }
    }

    /// workspaceに所属するuserの一覧を取得する。
    pub fn run(&self) -> Result<Vec<WorkspaceUser>> {
        let users = self
            .toggl_client
            .read_workspace_users()
            .context("Failed to retrieve workspace users")?;
        info!("Workspace users retrieved successfully.");

        Ok(users)
    }
}
