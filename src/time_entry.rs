use crate::error::Error;

/// レポートの1行分のtime entryを表す構造体。
///
/// レスポンスのstreamから1行ずつ読み込んで利用し、保存はしない。
/// `user`と`date`は集計では利用しないが、そのまま保持する。
#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub duration: i64,
    pub tags: Vec<String>,
    pub user: String,
    pub date: String,
}

/// `HH:MM:SS`形式の文字列を秒数に変換する。
///
/// 内部ではdurationを秒数の整数としてのみ扱い、文字列との変換はI/Oの境界だけで行う。
/// 各要素が非負整数の3要素でない場合はエラーを返す。
///
/// # Examples
///
/// ```
/// assert_eq!(parse_duration("01:30:00").unwrap(), 5400);
/// ```
pub fn parse_duration(text: &str) -> Result<i64, Error> {
    let invalid = || Error::Format(format!("Invalid duration: {}", text));

    let parts: Vec<&str> = text.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;
    if hours < 0 || minutes < 0 || seconds < 0 {
        return Err(invalid());
    }

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// 秒数を`H:MM:SS`形式の文字列に変換する。
///
/// 時間はゼロ埋めしない。負の秒数は先頭に`-`を付けて表示する。
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// カンマ区切りのタグ文字列を分割する。
///
/// 前後の空白は取り除き、空の要素は除外する。大文字小文字は変換しない。
pub fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
