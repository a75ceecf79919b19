//! Statement splitting for multi-statement scripts

/// Split `sql` into individual statements on top-level `;`.
///
/// Semicolons inside single-quoted strings, double-quoted identifiers,
/// `$$` blocks and comments do not split. Statements that are empty or
/// consist only of comments are dropped. Returned statements are trimmed
/// and carry no trailing `;`.
pub fn split_statements(sql: &str) -> Vec<String> {
    let chars: Vec<char> = sql.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\'' => {
                let end = scan_single_quoted(&chars, i);
                current.extend(&chars[i..end]);
                has_code = true;
                i = end;
            }
            '"' => {
                let end = scan_until(&chars, i + 1, &['"']).map_or(chars.len(), |e| e + 1);
                current.extend(&chars[i..end]);
                has_code = true;
                i = end;
            }
            '$' if next == Some('$') => {
                let end = find_pair(&chars, i + 2, '$', '$').map_or(chars.len(), |e| e + 2);
                current.extend(&chars[i..end]);
                has_code = true;
                i = end;
            }
            '-' if next == Some('-') => {
                let end = scan_until(&chars, i, &['\n']).unwrap_or(chars.len());
                current.extend(&chars[i..end]);
                i = end;
            }
            '/' if next == Some('*') => {
                let end = find_pair(&chars, i + 2, '*', '/').map_or(chars.len(), |e| e + 2);
                current.extend(&chars[i..end]);
                i = end;
            }
            ';' => {
                push_statement(&mut statements, &mut current, has_code);
                has_code = false;
                i += 1;
            }
            _ => {
                if !c.is_whitespace() {
                    has_code = true;
                }
                current.push(c);
                i += 1;
            }
        }
    }
    push_statement(&mut statements, &mut current, has_code);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String, has_code: bool) {
    let statement = current.trim();
    if has_code && !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

/// End (exclusive) of the single-quoted string starting at `start`.
/// Handles both `''` and `\'` escapes.
fn scan_single_quoted(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\'' if chars.get(i + 1) == Some(&'\'') => i += 2,
            '\'' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn scan_until(chars: &[char], from: usize, stops: &[char]) -> Option<usize> {
    (from..chars.len()).find(|&i| stops.contains(&chars[i]))
}

fn find_pair(chars: &[char], from: usize, first: char, second: char) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&i| chars[i] == first && chars[i + 1] == second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        assert_eq!(
            split_statements("select 1; select 2;\n"),
            vec!["select 1", "select 2"]
        );
    }

    #[test]
    fn test_semicolon_in_string_and_identifier() {
        let stmts = split_statements(r#"insert into "a;b" values ('x;y', 'it''s;'); select 1"#);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], r#"insert into "a;b" values ('x;y', 'it''s;')"#);
    }

    #[test]
    fn test_backslash_escape_in_string() {
        let stmts = split_statements(r"select 'a\';b'; select 2");
        assert_eq!(stmts, vec![r"select 'a\';b'", "select 2"]);
    }

    #[test]
    fn test_dollar_block_kept_whole() {
        let sql = "create procedure p() returns int language sql as $$ begin return 1; end $$; select 3";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].ends_with("end $$"));
    }

    #[test]
    fn test_comments_do_not_split() {
        let sql = "-- setup; for app\ncreate schema s; /* a; b */ select 1;";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("create schema s"));
    }

    #[test]
    fn test_comment_only_statements_dropped() {
        assert!(split_statements("-- nothing here\n;  ; /* still nothing */").is_empty());
    }

    #[test]
    fn test_unterminated_string_is_kept() {
        assert_eq!(split_statements("select 'abc"), vec!["select 'abc"]);
    }
}
