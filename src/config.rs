use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Error;

const CONFIG_FILE_NAME: &str = ".togglrc";

/// `.togglrc`のファイル全体をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct ConfigFile {
    toggl: TogglSection,
}

/// `.togglrc`の`[toggl]`セクションをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct TogglSection {
    apikey: String,
    workspace: String,
}

/// `.togglrc`から読み込んだ設定値。
///
/// 起動時に1度だけ読み込み、実行中に書き換えることはない。
#[derive(Clone, Debug)]
pub struct Config {
    pub api_token: String,
    pub workspace: String,
}

impl Config {
    /// `.togglrc`を読み込んで設定値を返す。
    ///
    /// カレントディレクトリに`.togglrc`があればそれを、なければホームディレクトリの
    /// `.togglrc`を利用する。ファイルや必須キーが存在しない場合はエラーを返す。
    pub fn load() -> Result<Self, Error> {
        let path = Self::locate()?;
        let text = fs::read_to_string(&path)
            .map_err(|err| Error::Config(format!("Failed to read {}: {}", path.display(), err)))?;

        Self::parse(&text)
    }

    /// 設定ファイルの探索を行う。
    fn locate() -> Result<PathBuf, Error> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok(local);
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Home directory is not available".to_string()))?;
        let path = home.join(CONFIG_FILE_NAME);
        if path.is_file() {
            return Ok(path);
        }

        Err(Error::Config(format!(
            "{} not found in the current or home directory",
            CONFIG_FILE_NAME
        )))
    }

    /// 設定ファイルの中身をパースする。
    fn parse(text: &str) -> Result<Self, Error> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|err| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, err)))?;

        Ok(Self {
            api_token: file.toggl.apikey,
            workspace: file.toggl.workspace,
        })
    }
}
