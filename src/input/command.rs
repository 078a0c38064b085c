use crate::domain::DateLabel;

/// A user intent read from the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    /// 1-based position in the list
    Toggle(usize),
    Remove(usize),
    List,
    ToggleHistory,
    Forget(DateLabel),
    ToggleTheme,
    Sync,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse one input line
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "add" | "a" => Command::Add(rest.to_string()),
        "toggle" | "done" | "t" => parse_position(rest).map_or_else(|| unknown(line), Command::Toggle),
        "rm" | "remove" | "del" => parse_position(rest).map_or_else(|| unknown(line), Command::Remove),
        "list" | "ls" | "l" => Command::List,
        "history" | "h" => Command::ToggleHistory,
        "forget" => {
            if rest.is_empty() {
                unknown(line)
            } else {
                Command::Forget(DateLabel::new(rest))
            }
        }
        "theme" => Command::ToggleTheme,
        "sync" => Command::Sync,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => unknown(line),
    }
}

fn parse_position(s: &str) -> Option<usize> {
    s.parse().ok()
}

fn unknown(line: &str) -> Command {
    Command::Unknown(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_keeps_text() {
        assert_eq!(
            parse_command("add  Buy milk and eggs "),
            Command::Add("Buy milk and eggs".to_string())
        );
        assert_eq!(parse_command("add"), Command::Add(String::new()));
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse_command("done 2"), Command::Toggle(2));
        assert_eq!(parse_command("toggle 1"), Command::Toggle(1));
        assert_eq!(parse_command("rm 3"), Command::Remove(3));
        assert_eq!(parse_command("rm x"), Command::Unknown("rm x".to_string()));
        assert_eq!(parse_command("done"), Command::Unknown("done".to_string()));
    }

    #[test]
    fn test_parse_forget_date() {
        assert_eq!(
            parse_command("forget January 5, 2025"),
            Command::Forget(DateLabel::new("January 5, 2025"))
        );
        assert_eq!(parse_command("forget"), Command::Unknown("forget".to_string()));
    }

    #[test]
    fn test_parse_simple_words() {
        assert_eq!(parse_command("  "), Command::Empty);
        assert_eq!(parse_command("LIST"), Command::List);
        assert_eq!(parse_command("history"), Command::ToggleHistory);
        assert_eq!(parse_command("theme"), Command::ToggleTheme);
        assert_eq!(parse_command("sync"), Command::Sync);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("dance"), Command::Unknown("dance".to_string()));
    }
}
