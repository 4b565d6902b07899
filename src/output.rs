//! 進捗表示
//!
//! 依存解決・削除の各パッケージの結果をイベントとして受け取り表示する。

use owo_colors::OwoColorize;

/// パッケージ単位の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    /// 取得・展開した
    Installed { sha: String, files: usize },
    /// VCS ツールに委譲した
    Delegated,
    /// 今回の実行で処理済み
    SkippedDuplicate,
    /// どのホストにも一致しない
    SkippedInvalid,
    /// 処理に失敗した
    Failed(String),
    /// バンドルを展開した（メンバーの表示用文字列）
    BundleExpanded(Vec<String>),
    /// ローカルにバンドルが無い
    BundleNotFound,
    /// スナップショットは未実装
    SnapshotUnsupported,
    /// 削除した
    Removed,
    /// インストールされていない
    NotInstalled,
}

/// 処理結果イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEvent {
    pub import_path: String,
    pub status: PackageStatus,
}

impl PackageEvent {
    pub fn new(import_path: impl Into<String>, status: PackageStatus) -> Self {
        Self {
            import_path: import_path.into(),
            status,
        }
    }
}

/// イベントの受け取り先
pub trait Reporter {
    fn report(&mut self, event: PackageEvent);
}

/// 件数の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, status: &PackageStatus) {
        match status {
            PackageStatus::Installed { .. } | PackageStatus::Delegated | PackageStatus::Removed => {
                self.succeeded += 1
            }
            PackageStatus::SkippedDuplicate | PackageStatus::SkippedInvalid => self.skipped += 1,
            PackageStatus::Failed(_)
            | PackageStatus::BundleNotFound
            | PackageStatus::SnapshotUnsupported
            | PackageStatus::NotInstalled => self.failed += 1,
            PackageStatus::BundleExpanded(_) => {}
        }
    }
}

/// 標準出力に表示する Reporter
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    tally: Tally,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: PackageEvent) {
        self.tally.record(&event.status);
        let path = &event.import_path;

        match &event.status {
            PackageStatus::Installed { sha, files } => println!(
                "{} {} @ {} ({} files)",
                "✓".green(),
                path.bold(),
                short_sha(sha).dimmed(),
                files
            ),
            PackageStatus::Delegated => {
                println!("{} {} (installed by go get)", "✓".green(), path.bold())
            }
            PackageStatus::Removed => println!("{} Removed {}", "✓".green(), path.bold()),
            PackageStatus::SkippedDuplicate => {
                println!("{} Skipped {} (already processed)", "•".yellow(), path)
            }
            PackageStatus::SkippedInvalid => {
                println!("{} Skipped {} (invalid import path)", "•".yellow(), path)
            }
            PackageStatus::Failed(message) => {
                println!("{} {}: {}", "✗".red(), path.bold(), message)
            }
            PackageStatus::BundleExpanded(members) => {
                println!("{} Bundle {}:", "i".cyan(), path.bold());
                for member in members {
                    println!("    {}", member);
                }
            }
            PackageStatus::BundleNotFound => println!(
                "{} Bundle {} not found locally; remote lookup is not supported",
                "✗".red(),
                path.bold()
            ),
            PackageStatus::SnapshotUnsupported => println!(
                "{} Snapshot {} skipped: snapshots are not implemented",
                "•".yellow(),
                path.bold()
            ),
            PackageStatus::NotInstalled => {
                println!("{} Package not found: {}", "✗".red(), path.bold())
            }
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..10).unwrap_or(sha)
}

/// 実行結果の1行サマリー
pub struct CommandSummary {
    pub prefix: String,
    pub message: String,
}

impl CommandSummary {
    pub fn format(tally: Tally, verb: &str) -> Self {
        match tally {
            Tally { failed, .. } if failed > 0 => Self {
                prefix: "✗".red().to_string(),
                message: format!(
                    "{} {}, {} skipped, {} failed",
                    tally.succeeded.green(),
                    verb,
                    tally.skipped,
                    failed.red()
                ),
            },
            Tally { succeeded, .. } if succeeded > 0 => Self {
                prefix: "✓".green().to_string(),
                message: format!(
                    "{} package(s) {}, {} skipped",
                    succeeded.green(),
                    verb,
                    tally.skipped
                ),
            },
            _ => Self {
                prefix: "•".yellow().to_string(),
                message: format!("Nothing {}", verb),
            },
        }
    }
}

impl std::fmt::Display for CommandSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.prefix, self.message)
    }
}

/// イベントを記録するだけの Reporter
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<PackageEvent>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn statuses_for(&self, import_path: &str) -> Vec<&PackageStatus> {
        self.events
            .iter()
            .filter(|e| e.import_path == import_path)
            .map(|e| &e.status)
            .collect()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn report(&mut self, event: PackageEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_record() {
        let mut tally = Tally::default();
        tally.record(&PackageStatus::Installed {
            sha: "abc".into(),
            files: 1,
        });
        tally.record(&PackageStatus::SkippedDuplicate);
        tally.record(&PackageStatus::Failed("boom".into()));
        tally.record(&PackageStatus::BundleExpanded(vec![]));

        assert_eq!(
            tally,
            Tally {
                succeeded: 1,
                skipped: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_summary_failure_wins() {
        let summary = CommandSummary::format(
            Tally {
                succeeded: 2,
                skipped: 0,
                failed: 1,
            },
            "installed",
        );
        assert!(summary.prefix.contains('✗'));
        assert!(summary.message.contains("failed"));
    }

    #[test]
    fn test_summary_nothing() {
        let summary = CommandSummary::format(Tally::default(), "removed");
        assert_eq!(summary.message, "Nothing removed");
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456789");
        assert_eq!(short_sha("v1.0"), "v1.0");
    }
}
