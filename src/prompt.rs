//! 確認プロンプト

use std::io::{self, BufRead, Write};

/// 続行確認 trait
pub trait Confirm {
    /// `message` を表示して続行するかを返す
    fn confirm(&mut self, message: &str) -> bool;
}

/// 標準入力から y/yes を受け付ける
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N]: ", message);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => is_yes(&input),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                false
            }
        }
    }
}

/// 常に同じ答えを返す（`--yes` とテスト用）
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}

fn is_yes(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes")
}
