use crate::error::{KeyrouteError, Result};

/// Разбить командную строку на программу и аргументы.
///
/// Понимает одинарные и двойные кавычки и экранирование обратной косой
/// чертой, но не подстановки оболочки: `$VAR`, `|` и `;` остаются текстом.
pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(KeyrouteError::InvalidConfig(format!(
            "незакрытая кавычка {} в команде '{}'",
            q, line
        )));
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(
            split_command_line("amixer -q set Master 5%+").unwrap(),
            vec!["amixer", "-q", "set", "Master", "5%+"]
        );
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(
            split_command_line(r#"urxvt -e sh -c "htop; read x""#).unwrap(),
            vec!["urxvt", "-e", "sh", "-c", "htop; read x"]
        );
        assert_eq!(
            split_command_line("notify-send 'a  b' ''").unwrap(),
            vec!["notify-send", "a  b", ""]
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            split_command_line(r#"echo a\ b "c\"d""#).unwrap(),
            vec!["echo", "a b", "c\"d"]
        );
    }

    #[test]
    fn test_empty_line() {
        assert!(split_command_line("   ").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(split_command_line("sh -c 'oops").is_err());
    }
}
